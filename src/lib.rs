#![allow(clippy::module_inception)]

//! Semantic analysis and MIPS code generation for C-minus.
//!
//! A parsed `ast::Program` goes through `session::compile`: the type checker
//! resolves every identifier against a scoped symbol table and records
//! diagnostics, and a program without diagnostics is lowered to SPIM
//! assembly.

pub mod ast;
pub mod compiler;
pub mod errors;
pub mod options;
pub mod session;
pub mod symbol_table;
pub mod type_checker;

pub use compiler::{Assembly, Line};
pub use errors::{Category, Diagnostic, FatalError, InternalError};
pub use options::CompileOptions;
pub use session::{compile, Compilation, Session};
