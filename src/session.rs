//! One compilation, from checking to assembly.
//!
//! A `Session` owns every piece of mutable state a compilation needs, so
//! separate sessions never observe each other.

use log::{info, warn};

use crate::{
    ast::Program,
    compiler::{self, Assembly},
    errors::{Diagnostic, FatalError, InternalError},
    options::CompileOptions,
    symbol_table::{SymbolTable, SymbolTableError},
    type_checker::TypeChecker,
};

/// Outcome of a compilation that did not fail outright.
#[derive(Debug, Clone, PartialEq)]
pub enum Compilation {
    /// The program has semantic errors; no code was generated.
    Rejected(Vec<Diagnostic>),
    Assembled(Assembly),
}

impl Compilation {
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            Compilation::Rejected(diagnostics) => diagnostics,
            Compilation::Assembled(_) => &[],
        }
    }

    pub fn assembly(&self) -> Option<&Assembly> {
        match self {
            Compilation::Rejected(_) => None,
            Compilation::Assembled(assembly) => Some(assembly),
        }
    }
}

#[derive(Debug)]
pub struct Session {
    pub options: CompileOptions,
    pub table: SymbolTable,
    pub diagnostics: Vec<Diagnostic>,
}

impl Session {
    pub fn new(options: CompileOptions) -> Self {
        Session {
            options,
            table: SymbolTable::new(options.max_scope_depth),
            diagnostics: vec![],
        }
    }

    /// Type checks `program`, appending any new diagnostics to the session.
    ///
    /// Checking an already checked program reports nothing new.
    pub fn check(&mut self, program: &mut Program) -> Result<&[Diagnostic], SymbolTableError> {
        let mut type_checker = TypeChecker::new(&mut self.table);
        type_checker.check_program(program)?;
        self.diagnostics.append(&mut type_checker.diagnostics);
        Ok(&self.diagnostics)
    }

    /// Generates assembly for a program this session checked.
    pub fn generate(&mut self, program: &Program) -> Result<Assembly, InternalError> {
        compiler::compile(program, &mut self.table, self.options)
    }

    pub fn compile(&mut self, program: &mut Program) -> Result<Compilation, FatalError> {
        self.check(program)?;

        if !self.diagnostics.is_empty() {
            warn!(
                "Session: {} diagnostic(s), skipping code generation",
                self.diagnostics.len()
            );
            return Ok(Compilation::Rejected(self.diagnostics.clone()));
        }

        let assembly = self.generate(program)?;
        info!("Session: compilation succeeded");
        Ok(Compilation::Assembled(assembly))
    }
}

/// Checks and compiles `program` in a fresh session.
pub fn compile(program: &mut Program, options: CompileOptions) -> Result<Compilation, FatalError> {
    Session::new(options).compile(program)
}
