use super::{ast::VariableDecl, expressions::Expr, types::NodeType};

/// Statement node. Statements resolve to `NodeType::None` once checked.
#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub line: u32,
    pub node_type: NodeType,
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    Compound(CompoundStmt),
    /// `expr;` or the empty statement `;`.
    Expression(Option<Expr>),
    Selection(SelectionStmt),
    Iteration(IterationStmt),
    Return(Option<Expr>),
}

/// `{ local declarations; statements }`
#[derive(Debug, Clone)]
pub struct CompoundStmt {
    pub locals: Vec<VariableDecl>,
    pub statements: Vec<Stmt>,
}

impl CompoundStmt {
    pub fn new(locals: Vec<VariableDecl>, statements: Vec<Stmt>) -> Self {
        CompoundStmt { locals, statements }
    }

    /// Bytes of stack the local declarations occupy, `None` on overflow.
    pub fn locals_size(&self) -> Option<u32> {
        self.locals
            .iter()
            .try_fold(0u32, |total, local| total.checked_add(local.size_in_bytes()?))
    }
}

/// `if (condition) then_branch [else else_branch]`
#[derive(Debug, Clone)]
pub struct SelectionStmt {
    pub condition: Expr,
    pub then_branch: Box<Stmt>,
    pub else_branch: Option<Box<Stmt>>,
}

/// `while (condition) body`
#[derive(Debug, Clone)]
pub struct IterationStmt {
    pub condition: Expr,
    pub body: Box<Stmt>,
}

impl Stmt {
    fn new(line: u32, kind: StmtKind) -> Self {
        Stmt {
            kind,
            line,
            node_type: NodeType::NotResolved,
        }
    }

    pub fn compound(line: u32, locals: Vec<VariableDecl>, statements: Vec<Stmt>) -> Self {
        Stmt::new(line, StmtKind::Compound(CompoundStmt::new(locals, statements)))
    }

    pub fn expression(line: u32, expression: Expr) -> Self {
        Stmt::new(line, StmtKind::Expression(Some(expression)))
    }

    pub fn empty(line: u32) -> Self {
        Stmt::new(line, StmtKind::Expression(None))
    }

    pub fn selection(line: u32, condition: Expr, then_branch: Stmt, else_branch: Option<Stmt>) -> Self {
        Stmt::new(
            line,
            StmtKind::Selection(SelectionStmt {
                condition,
                then_branch: Box::new(then_branch),
                else_branch: else_branch.map(Box::new),
            }),
        )
    }

    pub fn iteration(line: u32, condition: Expr, body: Stmt) -> Self {
        Stmt::new(
            line,
            StmtKind::Iteration(IterationStmt {
                condition,
                body: Box::new(body),
            }),
        )
    }

    pub fn ret(line: u32, value: Option<Expr>) -> Self {
        Stmt::new(line, StmtKind::Return(value))
    }
}
