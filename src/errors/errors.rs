use std::fmt::Display;

use thiserror::Error;

use crate::{ast::NodeType, symbol_table::SymbolTableError};

/// Which family of rule a diagnostic belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Declaration,
    Type,
    Main,
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Declaration => write!(f, "Declaration error"),
            Category::Type => write!(f, "Type error"),
            Category::Main => write!(f, "Main error"),
        }
    }
}

/// A user-facing problem found while checking, tied to a source line.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    internal_error: ErrorImpl,
    line: u32,
}

impl Diagnostic {
    pub fn new(error_impl: ErrorImpl, line: u32) -> Self {
        Diagnostic {
            internal_error: error_impl,
            line,
        }
    }

    pub fn get_line(&self) -> u32 {
        self.line
    }

    pub fn get_error(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn get_message(&self) -> String {
        self.internal_error.to_string()
    }

    pub fn get_category(&self) -> Category {
        match &self.internal_error {
            ErrorImpl::VariableAlreadyDeclared { .. } | ErrorImpl::VariableNotDeclared { .. } => {
                Category::Declaration
            }
            ErrorImpl::MissingMain | ErrorImpl::MainNotLast | ErrorImpl::MainSignature { .. } => {
                Category::Main
            }
            _ => Category::Type,
        }
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::VariableAlreadyDeclared { .. } => "VariableAlreadyDeclared",
            ErrorImpl::VariableNotDeclared { .. } => "VariableNotDeclared",
            ErrorImpl::VoidVariable { .. } => "VoidVariable",
            ErrorImpl::InvalidArrayLength { .. } => "InvalidArrayLength",
            ErrorImpl::ConditionTypeMatchError { .. } => "ConditionTypeMatchError",
            ErrorImpl::OperandTypeMatchError { .. } => "OperandTypeMatchError",
            ErrorImpl::AssignmentTypeMatchError { .. } => "AssignmentTypeMatchError",
            ErrorImpl::InvalidAssignmentTarget => "InvalidAssignmentTarget",
            ErrorImpl::NotAnArray { .. } => "NotAnArray",
            ErrorImpl::IndexTypeMatchError { .. } => "IndexTypeMatchError",
            ErrorImpl::NotCallable { .. } => "NotCallable",
            ErrorImpl::FunctionAsValue { .. } => "FunctionAsValue",
            ErrorImpl::UnexpectedArguments { .. } => "UnexpectedArguments",
            ErrorImpl::MissingArguments { .. } => "MissingArguments",
            ErrorImpl::ArgumentTypeMatchError { .. } => "ArgumentTypeMatchError",
            ErrorImpl::ReturnTypeMatchError { .. } => "ReturnTypeMatchError",
            ErrorImpl::MissingReturn { .. } => "MissingReturn",
            ErrorImpl::MissingMain => "MissingMain",
            ErrorImpl::MainNotLast => "MainNotLast",
            ErrorImpl::MainSignature { .. } => "MainSignature",
        }
    }

    /// The `(line, category, message)` record handed to the reporting tool.
    pub fn to_record(&self) -> (u32, Category, String) {
        (self.line, self.get_category(), self.get_message())
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at line {}: {}",
            self.get_category(),
            self.line,
            self.internal_error
        )
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    #[error("{name:?} is already declared in this scope")]
    VariableAlreadyDeclared { name: String },
    #[error("{name:?} is never declared")]
    VariableNotDeclared { name: String },
    #[error("{name:?} must be declared with type int, not void")]
    VoidVariable { name: String },
    #[error("array {name:?} has invalid length {length}")]
    InvalidArrayLength { name: String, length: i32 },
    #[error("condition must be int, received {received}")]
    ConditionTypeMatchError { received: NodeType },
    #[error("operands of `{operator}` must be int, received {left} and {right}")]
    OperandTypeMatchError {
        operator: String,
        left: NodeType,
        right: NodeType,
    },
    #[error("cannot assign {value} to {target}")]
    AssignmentTypeMatchError { target: NodeType, value: NodeType },
    #[error("assignment target is not a variable")]
    InvalidAssignmentTarget,
    #[error("{name:?} is not an array")]
    NotAnArray { name: String },
    #[error("array index must be int, received {received}")]
    IndexTypeMatchError { received: NodeType },
    #[error("{name:?} is not a function")]
    NotCallable { name: String },
    #[error("function {name:?} cannot be used as a value")]
    FunctionAsValue { name: String },
    #[error("too many parameters to {function:?}: expected {expected}, received {received}")]
    UnexpectedArguments {
        function: String,
        expected: usize,
        received: usize,
    },
    #[error("too little parameters to {function:?}: expected {expected}, received {received}")]
    MissingArguments {
        function: String,
        expected: usize,
        received: usize,
    },
    #[error("argument {position} of {function:?} must be {expected}, received {received}")]
    ArgumentTypeMatchError {
        function: String,
        position: usize,
        expected: NodeType,
        received: NodeType,
    },
    #[error("return type mismatch: expected {expected}, received {received}")]
    ReturnTypeMatchError {
        expected: NodeType,
        received: NodeType,
    },
    #[error("function {function:?} does not return an int on every path")]
    MissingReturn { function: String },
    #[error("program has no main function")]
    MissingMain,
    #[error("main must be the last declaration")]
    MainNotLast,
    #[error("main must be declared as `void main(void)`, found {return_type} with {params} parameter(s)")]
    MainSignature { return_type: NodeType, params: usize },
}

/// Broken precondition reaching the code generator. These signal a defect
/// in an earlier phase, never a problem with the input program.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InternalError {
    #[error("stack depth mismatch at {context}: expected {expected}, found {actual}")]
    StackImbalance {
        context: String,
        expected: u32,
        actual: u32,
    },
    #[error("node at line {line} reached code generation with type {found}")]
    UnresolvedType { line: u32, found: NodeType },
    #[error("identifier {name:?} at line {line} has no resolved symbol")]
    MissingSymbol { name: String, line: u32 },
    #[error("symbol {name:?} belongs to a function that is not being generated")]
    StaleSymbol { name: String },
    #[error("symbol {name:?} cannot be used as {expected}")]
    UnexpectedSymbol { name: String, expected: String },
    #[error("unexpected {node} at line {line}")]
    UnexpectedNode { node: String, line: u32 },
    #[error("symbol {name:?} has no memory location")]
    MissingLocation { name: String },
    #[error("storage for {name:?} does not fit in the address space")]
    StorageOverflow { name: String },
}

/// Anything that stops a compilation outright.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FatalError {
    #[error(transparent)]
    Scope(#[from] SymbolTableError),
    #[error("internal compiler error: {0}")]
    Internal(#[from] InternalError),
}
