//! Type system definitions for the AST.
//!
//! This module defines the two kinds of type information the tree carries:
//!
//! - `TypeSpecifier`, the `int`/`void` keyword the parser saw in a declaration
//! - `NodeType`, the type the checker resolved for a node
//!
//! Every node starts out as `NodeType::NotResolved` and is assigned a type
//! exactly once by the type checker.

use std::fmt::{self, Display};

/// The type keyword written in a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeSpecifier {
    Int,
    Void,
}

impl TypeSpecifier {
    /// The resolved type of a value declared with this specifier.
    pub fn scalar_type(self) -> NodeType {
        match self {
            TypeSpecifier::Int => NodeType::Int,
            TypeSpecifier::Void => NodeType::Void,
        }
    }
}

impl Display for TypeSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSpecifier::Int => write!(f, "int"),
            TypeSpecifier::Void => write!(f, "void"),
        }
    }
}

/// Resolved type of a node.
///
/// `None` is given to statements, which have no value. `Error` marks a node
/// whose checking already produced a diagnostic; it is absorbing, so nodes
/// built on top of it are not reported again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    NotResolved,
    Error,
    None,
    Void,
    Int,
    IntArray,
    Function,
}

impl NodeType {
    pub fn is_resolved(self) -> bool {
        self != NodeType::NotResolved
    }

    pub fn is_error(self) -> bool {
        self == NodeType::Error
    }
}

impl Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeType::NotResolved => "<unresolved>",
            NodeType::Error => "<error>",
            NodeType::None => "<none>",
            NodeType::Void => "void",
            NodeType::Int => "int",
            NodeType::IntArray => "int[]",
            NodeType::Function => "function",
        };
        write!(f, "{}", name)
    }
}
