//! Type checking and semantic analysis module.
//!
//! This module resolves identifiers and checks types on the AST in place.
//! It:
//!
//! - Registers every declaration in the scoped symbol table
//! - Binds each identifier use to its declaration's `SymbolId`
//! - Assigns a `NodeType` to every node, exactly once
//! - Checks operands, conditions, subscripts, calls and returns
//! - Validates the shape of `main` once the whole program is checked
//!
//! Problems are recorded as diagnostics and checking always runs to the end
//! of the tree.

pub mod expr;
pub mod stmt;
pub mod type_checker;

pub use type_checker::{type_check, TypeChecker, MAX_ARRAY_LENGTH};
