/// AST (Abstract Syntax Tree) module
/// Contains the tree the parser hands to the checker and code generator
///
/// Submodules:
/// - ast: Program and declaration nodes
/// - expressions: Expression nodes and operator tokens
/// - statements: Statement nodes
/// - types: Type specifiers and resolved node types
pub mod ast;
pub mod expressions;
pub mod statements;
pub mod types;

pub use ast::{Declaration, FunctionDecl, Parameter, Program, VariableDecl};
pub use expressions::{
    AdditiveOp, ArrayRef, AssignExpr, BinaryExpr, CallExpr, ComparisonOp, Expr, ExprKind,
    MultiplicativeOp, VariableRef,
};
pub use statements::{CompoundStmt, IterationStmt, SelectionStmt, Stmt, StmtKind};
pub use types::{NodeType, TypeSpecifier};
