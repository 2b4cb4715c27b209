//! Code generation module for the compiler.
//!
//! This module turns a checked AST into MIPS assembly for the SPIM
//! simulator. It handles:
//!
//! - Placement of globals, parameters and locals
//! - Function prologues and epilogues around a fixed frame header
//! - Expression evaluation through `$v0` and the stack
//! - The `input` and `output` library routines
//!
//! Generation never reports user errors. It fails only with an
//! `InternalError` when the tree breaks a precondition the checker should
//! have established.

pub mod assembly;
pub mod compiler;
pub mod expr;
pub mod stdlib;
pub mod stmt;

pub use assembly::{Assembly, Line};
pub use compiler::{compile, Compiler};

#[cfg(test)]
mod tests;
