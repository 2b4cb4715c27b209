//! Error types and error handling for the compiler.
//!
//! This module defines the error types used throughout compilation:
//!
//! - `Diagnostic`, a recorded user error with its source line and category
//! - `InternalError`, a fatal precondition violation inside code generation
//! - `FatalError`, everything that aborts a compilation
//!
//! Diagnostics are collected, never thrown, so one run reports every
//! problem in the program.

pub mod errors;

pub use errors::{Category, Diagnostic, ErrorImpl, FatalError, InternalError};
