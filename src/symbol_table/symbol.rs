use std::fmt::{self, Display};

use crate::ast::NodeType;

/// Handle to a symbol record in the table's arena.
///
/// Handles are only meaningful for the `SymbolTable` that minted them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(pub(crate) u32);

impl SymbolId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageClass {
    Global,
    Local,
    Parameter,
}

/// Library functions every program can call without declaring them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    /// `int input(void)`
    Input,
    /// `void output(int)`
    Output,
}

impl Builtin {
    pub const ALL: [Builtin; 2] = [Builtin::Input, Builtin::Output];

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Input => "input",
            Builtin::Output => "output",
        }
    }

    pub fn signature(self) -> FunctionSignature {
        match self {
            Builtin::Input => FunctionSignature {
                return_type: NodeType::Int,
                params: vec![],
            },
            Builtin::Output => FunctionSignature {
                return_type: NodeType::Void,
                params: vec![NodeType::Int],
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    pub return_type: NodeType,
    /// Parameter types in declaration order. Array parameters are
    /// `NodeType::IntArray` regardless of any declared length.
    pub params: Vec<NodeType>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolKind {
    Int,
    /// `length` is `None` for array parameters.
    IntArray { length: Option<i32> },
    Function(FunctionSignature),
    /// A declaration that was rejected; uses of it resolve to `NodeType::Error`.
    Invalid,
}

/// Where the code generator placed a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryLocation {
    /// Absolute address in the global data segment.
    Global(u32),
    /// Byte offset from the frame pointer.
    Frame(i32),
}

/// Compile-time record for one declared name.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub storage: StorageClass,
    /// Scope depth the symbol was declared at, filled in by `declare`.
    pub depth: usize,
    /// Index (in `Program::declarations`) of the function whose body declared
    /// this symbol. `None` for globals.
    pub owner: Option<usize>,
    pub builtin: Option<Builtin>,
    /// Assigned by the code generator.
    pub location: Option<MemoryLocation>,
    /// Declaration line followed by every line the name is used on.
    pub references: Vec<u32>,
}

impl Symbol {
    pub fn new(name: &str, kind: SymbolKind, storage: StorageClass, line: u32) -> Self {
        Symbol {
            name: name.to_string(),
            kind,
            storage,
            depth: 0,
            owner: None,
            builtin: None,
            location: None,
            references: vec![line],
        }
    }

    pub fn builtin(builtin: Builtin) -> Self {
        Symbol {
            builtin: Some(builtin),
            ..Symbol::new(
                builtin.name(),
                SymbolKind::Function(builtin.signature()),
                StorageClass::Global,
                0,
            )
        }
    }

    pub fn owned_by(mut self, function: Option<usize>) -> Self {
        self.owner = function;
        self
    }

    pub fn declared_line(&self) -> u32 {
        self.references.first().copied().unwrap_or(0)
    }

    pub fn node_type(&self) -> NodeType {
        match self.kind {
            SymbolKind::Int => NodeType::Int,
            SymbolKind::IntArray { .. } => NodeType::IntArray,
            SymbolKind::Function(_) => NodeType::Function,
            SymbolKind::Invalid => NodeType::Error,
        }
    }

    pub fn signature(&self) -> Option<&FunctionSignature> {
        match &self.kind {
            SymbolKind::Function(signature) => Some(signature),
            _ => None,
        }
    }
}
