use log::{debug, info};

use crate::{
    ast::{Declaration, FunctionDecl, NodeType, Parameter, Program, TypeSpecifier, VariableDecl},
    errors::{Diagnostic, ErrorImpl},
    symbol_table::{
        Builtin, FunctionSignature, StorageClass, Symbol, SymbolId, SymbolKind, SymbolTable,
        SymbolTableError,
    },
};

use super::stmt::compound_always_returns;

/// Longest array a declaration may ask for, in words.
pub const MAX_ARRAY_LENGTH: i32 = 1 << 24;

/// Walks the tree once, filling in types and symbol bindings.
///
/// The checker borrows the session's symbol table; the records it creates
/// stay in the table's arena for the code generator.
#[derive(Debug)]
pub struct TypeChecker<'t> {
    pub table: &'t mut SymbolTable,
    pub diagnostics: Vec<Diagnostic>,
    /// Declared return type of the function being checked.
    pub(super) return_type: Option<NodeType>,
    /// Index in `Program::declarations` of the function being checked.
    pub(super) current_function: Option<usize>,
}

impl<'t> TypeChecker<'t> {
    /// Creates a checker over `table`, registering `input` and `output` in
    /// its global scope.
    pub fn new(table: &'t mut SymbolTable) -> Self {
        for builtin in Builtin::ALL {
            if table.resolve(builtin.name()).is_some() {
                continue;
            }
            if let Err(error) = table.declare(Symbol::builtin(builtin)) {
                debug!("TypeChecker: could not register {}: {}", builtin.name(), error);
            }
        }

        TypeChecker {
            table,
            diagnostics: vec![],
            return_type: None,
            current_function: None,
        }
    }

    pub fn report(&mut self, error: ErrorImpl, line: u32) {
        debug!("TypeChecker: line {}: {}", line, error);
        self.diagnostics.push(Diagnostic::new(error, line));
    }

    pub(super) fn symbol_type(&self, id: SymbolId) -> NodeType {
        self.table
            .get(id)
            .map_or(NodeType::Error, |symbol| symbol.node_type())
    }

    /// Declares `symbol`, reporting a redeclaration instead of failing.
    ///
    /// Returns the id later uses should bind to and whether the declaration
    /// was accepted. On redeclaration that id is the earlier declaration's.
    fn declare_symbol(
        &mut self,
        symbol: Symbol,
        line: u32,
    ) -> Result<(SymbolId, bool), SymbolTableError> {
        match self.table.declare(symbol) {
            Ok(id) => Ok((id, true)),
            Err(SymbolTableError::AlreadyDeclared { name, previous }) => {
                self.report(ErrorImpl::VariableAlreadyDeclared { name }, line);
                Ok((previous, false))
            }
            Err(error) => Err(error),
        }
    }

    pub fn check_program(&mut self, program: &mut Program) -> Result<NodeType, SymbolTableError> {
        if program.node_type.is_resolved() {
            return Ok(program.node_type);
        }

        for (index, declaration) in program.declarations.iter_mut().enumerate() {
            match declaration {
                Declaration::Variable(variable) => {
                    self.check_variable_decl(variable, StorageClass::Global)?;
                }
                Declaration::Function(function) => {
                    self.check_function(index, function)?;
                }
            }
        }
        self.check_main(program);

        info!(
            "TypeChecker: finished with {} diagnostic(s)",
            self.diagnostics.len()
        );
        program.node_type = NodeType::None;
        Ok(program.node_type)
    }

    pub fn check_variable_decl(
        &mut self,
        variable: &mut VariableDecl,
        storage: StorageClass,
    ) -> Result<NodeType, SymbolTableError> {
        if variable.node_type.is_resolved() {
            return Ok(variable.node_type);
        }

        let mut valid = true;
        if variable.type_spec != TypeSpecifier::Int {
            self.report(
                ErrorImpl::VoidVariable {
                    name: variable.name.clone(),
                },
                variable.line,
            );
            valid = false;
        }

        let (kind, declared_type) = match variable.array_length {
            None => (SymbolKind::Int, NodeType::Int),
            Some(length) => {
                if !(1..=MAX_ARRAY_LENGTH).contains(&length) {
                    self.report(
                        ErrorImpl::InvalidArrayLength {
                            name: variable.name.clone(),
                            length,
                        },
                        variable.line,
                    );
                    valid = false;
                }
                (
                    SymbolKind::IntArray {
                        length: Some(length),
                    },
                    NodeType::IntArray,
                )
            }
        };

        let kind = if valid { kind } else { SymbolKind::Invalid };
        let symbol = Symbol::new(&variable.name, kind, storage, variable.line)
            .owned_by(self.current_function);
        let (id, accepted) = self.declare_symbol(symbol, variable.line)?;

        variable.symbol = Some(id);
        variable.node_type = if valid && accepted {
            declared_type
        } else {
            NodeType::Error
        };
        Ok(variable.node_type)
    }

    /// Registers the function before opening its scope, so the body can call
    /// it recursively. Parameters and the outermost block of the body share
    /// one scope.
    fn check_function(
        &mut self,
        index: usize,
        function: &mut FunctionDecl,
    ) -> Result<NodeType, SymbolTableError> {
        if function.node_type.is_resolved() {
            return Ok(function.node_type);
        }
        debug!("TypeChecker: checking function {:?}", function.name);

        let return_type = function.return_type.scalar_type();
        let signature = FunctionSignature {
            return_type,
            params: function.params.iter().map(parameter_type).collect(),
        };
        let symbol = Symbol::new(
            &function.name,
            SymbolKind::Function(signature),
            StorageClass::Global,
            function.line,
        );
        let (id, accepted) = self.declare_symbol(symbol, function.line)?;
        function.symbol = Some(id);

        self.table.push_scope()?;
        let enclosing_function = self.current_function.replace(index);
        let enclosing_return = self.return_type.replace(return_type);

        for param in function.params.iter_mut() {
            self.check_parameter(param)?;
        }
        self.check_compound(&mut function.body, false)?;

        if return_type != NodeType::Void && !compound_always_returns(&function.body) {
            self.report(
                ErrorImpl::MissingReturn {
                    function: function.name.clone(),
                },
                function.line,
            );
        }

        self.current_function = enclosing_function;
        self.return_type = enclosing_return;
        self.table.pop_scope()?;

        function.node_type = if accepted {
            NodeType::Function
        } else {
            NodeType::Error
        };
        Ok(function.node_type)
    }

    fn check_parameter(&mut self, param: &mut Parameter) -> Result<NodeType, SymbolTableError> {
        if param.node_type.is_resolved() {
            return Ok(param.node_type);
        }

        let valid = param.type_spec == TypeSpecifier::Int;
        if !valid {
            self.report(
                ErrorImpl::VoidVariable {
                    name: param.name.clone(),
                },
                param.line,
            );
        }

        let kind = match (valid, param.is_array) {
            (false, _) => SymbolKind::Invalid,
            (true, false) => SymbolKind::Int,
            (true, true) => SymbolKind::IntArray { length: None },
        };
        let symbol = Symbol::new(&param.name, kind, StorageClass::Parameter, param.line)
            .owned_by(self.current_function);
        let (id, accepted) = self.declare_symbol(symbol, param.line)?;

        param.symbol = Some(id);
        param.node_type = if accepted {
            parameter_type(param)
        } else {
            NodeType::Error
        };
        Ok(param.node_type)
    }

    /// `main` must be the last declaration and be `void main(void)`.
    fn check_main(&mut self, program: &Program) {
        match program.declarations.last() {
            Some(Declaration::Function(function)) if function.name == "main" => {
                if function.return_type != TypeSpecifier::Void || !function.params.is_empty() {
                    self.report(
                        ErrorImpl::MainSignature {
                            return_type: function.return_type.scalar_type(),
                            params: function.params.len(),
                        },
                        function.line,
                    );
                }
            }
            last => {
                match program.functions().find(|(_, function)| function.name == "main") {
                    Some((_, main)) => self.report(ErrorImpl::MainNotLast, main.line),
                    None => self.report(
                        ErrorImpl::MissingMain,
                        last.map_or(0, |declaration| declaration.line()),
                    ),
                }
            }
        }
    }
}

/// Type a parameter contributes to its function's signature.
fn parameter_type(param: &Parameter) -> NodeType {
    match (param.type_spec, param.is_array) {
        (TypeSpecifier::Void, _) => NodeType::Error,
        (TypeSpecifier::Int, false) => NodeType::Int,
        (TypeSpecifier::Int, true) => NodeType::IntArray,
    }
}

/// Checks `program` against a fresh view of `table`, returning every
/// diagnostic found. Only scope overflow aborts checking.
pub fn type_check(
    program: &mut Program,
    table: &mut SymbolTable,
) -> Result<Vec<Diagnostic>, SymbolTableError> {
    let mut type_checker = TypeChecker::new(table);
    type_checker.check_program(program)?;
    Ok(type_checker.diagnostics)
}
