use std::fmt::{self, Display};

use crate::symbol_table::SymbolId;

use super::types::NodeType;

/// Expression node.
#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub line: u32,
    pub node_type: NodeType,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Assign(AssignExpr),
    Comparison(BinaryExpr<ComparisonOp>),
    Additive(BinaryExpr<AdditiveOp>),
    Multiplicative(BinaryExpr<MultiplicativeOp>),
    Variable(VariableRef),
    Array(ArrayRef),
    Call(CallExpr),
    Constant(i32),
}

/// `target = value`. The parser only produces variable and array
/// references as targets.
#[derive(Debug, Clone)]
pub struct AssignExpr {
    pub target: Box<Expr>,
    pub value: Box<Expr>,
}

#[derive(Debug, Clone)]
pub struct BinaryExpr<Op> {
    pub op: Op,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
}

/// Bare identifier use. Resolves to a scalar value, or to an address when
/// the identifier names an array.
#[derive(Debug, Clone)]
pub struct VariableRef {
    pub name: String,
    pub symbol: Option<SymbolId>,
}

/// `name[index]`
#[derive(Debug, Clone)]
pub struct ArrayRef {
    pub name: String,
    pub index: Box<Expr>,
    pub symbol: Option<SymbolId>,
}

/// `name(args...)`
#[derive(Debug, Clone)]
pub struct CallExpr {
    pub name: String,
    pub args: Vec<Expr>,
    pub symbol: Option<SymbolId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdditiveOp {
    Plus,
    Minus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiplicativeOp {
    Times,
    Over,
}

impl Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            ComparisonOp::Lt => "<",
            ComparisonOp::Le => "<=",
            ComparisonOp::Gt => ">",
            ComparisonOp::Ge => ">=",
            ComparisonOp::Eq => "==",
            ComparisonOp::Ne => "!=",
        };
        write!(f, "{}", symbol)
    }
}

impl Display for AdditiveOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdditiveOp::Plus => write!(f, "+"),
            AdditiveOp::Minus => write!(f, "-"),
        }
    }
}

impl Display for MultiplicativeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MultiplicativeOp::Times => write!(f, "*"),
            MultiplicativeOp::Over => write!(f, "/"),
        }
    }
}

impl Expr {
    fn new(line: u32, kind: ExprKind) -> Self {
        Expr {
            kind,
            line,
            node_type: NodeType::NotResolved,
        }
    }

    pub fn constant(line: u32, value: i32) -> Self {
        Expr::new(line, ExprKind::Constant(value))
    }

    pub fn variable(line: u32, name: &str) -> Self {
        Expr::new(
            line,
            ExprKind::Variable(VariableRef {
                name: name.to_string(),
                symbol: None,
            }),
        )
    }

    pub fn array(line: u32, name: &str, index: Expr) -> Self {
        Expr::new(
            line,
            ExprKind::Array(ArrayRef {
                name: name.to_string(),
                index: Box::new(index),
                symbol: None,
            }),
        )
    }

    pub fn call(line: u32, name: &str, args: Vec<Expr>) -> Self {
        Expr::new(
            line,
            ExprKind::Call(CallExpr {
                name: name.to_string(),
                args,
                symbol: None,
            }),
        )
    }

    pub fn assign(line: u32, target: Expr, value: Expr) -> Self {
        Expr::new(
            line,
            ExprKind::Assign(AssignExpr {
                target: Box::new(target),
                value: Box::new(value),
            }),
        )
    }

    pub fn comparison(line: u32, op: ComparisonOp, left: Expr, right: Expr) -> Self {
        Expr::new(line, ExprKind::Comparison(BinaryExpr::new(op, left, right)))
    }

    pub fn additive(line: u32, op: AdditiveOp, left: Expr, right: Expr) -> Self {
        Expr::new(line, ExprKind::Additive(BinaryExpr::new(op, left, right)))
    }

    pub fn multiplicative(line: u32, op: MultiplicativeOp, left: Expr, right: Expr) -> Self {
        Expr::new(line, ExprKind::Multiplicative(BinaryExpr::new(op, left, right)))
    }
}

impl<Op> BinaryExpr<Op> {
    fn new(op: Op, left: Expr, right: Expr) -> Self {
        BinaryExpr {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}
