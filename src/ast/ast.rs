use crate::symbol_table::SymbolId;

use super::{statements::CompoundStmt, types::{NodeType, TypeSpecifier}};

/// Root of the tree: the top-level declarations in source order.
#[derive(Debug, Clone)]
pub struct Program {
    pub declarations: Vec<Declaration>,
    /// Set to `NodeType::None` once the whole program has been checked.
    pub node_type: NodeType,
}

impl Program {
    pub fn new(declarations: Vec<Declaration>) -> Self {
        Program {
            declarations,
            node_type: NodeType::NotResolved,
        }
    }

    /// Iterates over the function declarations in source order, with their
    /// index in `declarations`.
    pub fn functions(&self) -> impl Iterator<Item = (usize, &FunctionDecl)> {
        self.declarations
            .iter()
            .enumerate()
            .filter_map(|(index, declaration)| match declaration {
                Declaration::Function(function) => Some((index, function)),
                Declaration::Variable(_) => None,
            })
    }
}

/// Top-level declaration.
#[derive(Debug, Clone)]
pub enum Declaration {
    Variable(VariableDecl),
    Function(FunctionDecl),
}

impl Declaration {
    pub fn line(&self) -> u32 {
        match self {
            Declaration::Variable(variable) => variable.line,
            Declaration::Function(function) => function.line,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Declaration::Variable(variable) => &variable.name,
            Declaration::Function(function) => &function.name,
        }
    }
}

impl From<VariableDecl> for Declaration {
    fn from(variable: VariableDecl) -> Self {
        Declaration::Variable(variable)
    }
}

impl From<FunctionDecl> for Declaration {
    fn from(function: FunctionDecl) -> Self {
        Declaration::Function(function)
    }
}

/// Variable or array declaration, global or local.
///
/// `array_length` is `Some` for `int name[N];`.
#[derive(Debug, Clone)]
pub struct VariableDecl {
    pub type_spec: TypeSpecifier,
    pub name: String,
    pub array_length: Option<i32>,
    pub line: u32,
    pub node_type: NodeType,
    pub symbol: Option<SymbolId>,
}

impl VariableDecl {
    pub fn scalar(line: u32, type_spec: TypeSpecifier, name: &str) -> Self {
        VariableDecl {
            type_spec,
            name: name.to_string(),
            array_length: None,
            line,
            node_type: NodeType::NotResolved,
            symbol: None,
        }
    }

    pub fn array(line: u32, type_spec: TypeSpecifier, name: &str, length: i32) -> Self {
        VariableDecl {
            array_length: Some(length),
            ..VariableDecl::scalar(line, type_spec, name)
        }
    }

    pub fn is_array(&self) -> bool {
        self.array_length.is_some()
    }

    /// Bytes of storage the declaration occupies, or `None` when the length
    /// is negative or the size overflows.
    pub fn size_in_bytes(&self) -> Option<u32> {
        match self.array_length {
            None => Some(4),
            Some(length) => u32::try_from(length).ok()?.checked_mul(4),
        }
    }
}

/// Function parameter: `int name` or `int name[]`.
#[derive(Debug, Clone)]
pub struct Parameter {
    pub type_spec: TypeSpecifier,
    pub name: String,
    pub is_array: bool,
    pub line: u32,
    pub node_type: NodeType,
    pub symbol: Option<SymbolId>,
}

impl Parameter {
    pub fn scalar(line: u32, type_spec: TypeSpecifier, name: &str) -> Self {
        Parameter {
            type_spec,
            name: name.to_string(),
            is_array: false,
            line,
            node_type: NodeType::NotResolved,
            symbol: None,
        }
    }

    pub fn array(line: u32, type_spec: TypeSpecifier, name: &str) -> Self {
        Parameter {
            is_array: true,
            ..Parameter::scalar(line, type_spec, name)
        }
    }
}

/// Function declaration. A `(void)` parameter list is an empty `params`.
#[derive(Debug, Clone)]
pub struct FunctionDecl {
    pub return_type: TypeSpecifier,
    pub name: String,
    pub params: Vec<Parameter>,
    pub body: CompoundStmt,
    pub line: u32,
    pub node_type: NodeType,
    pub symbol: Option<SymbolId>,
}

impl FunctionDecl {
    pub fn new(
        line: u32,
        return_type: TypeSpecifier,
        name: &str,
        params: Vec<Parameter>,
        body: CompoundStmt,
    ) -> Self {
        FunctionDecl {
            return_type,
            name: name.to_string(),
            params,
            body,
            line,
            node_type: NodeType::NotResolved,
            symbol: None,
        }
    }
}
