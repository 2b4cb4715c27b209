//! Scoped symbol table.
//!
//! This module resolves identifiers under lexical scoping. It provides:
//!
//! - A chained hash table whose chains are searched newest-first, so
//!   lookups see the nearest declaration of a name
//! - Per-scope bookkeeping of touched buckets so that popping a scope only
//!   revisits the chains that scope extended
//! - An arena of symbol records that outlives scope pops, addressed by
//!   `SymbolId` handles stored on the tree
//!
//! Popping a scope hides its names; the records themselves stay in the arena
//! so the code generator can still assign and read memory locations.

pub mod symbol;
pub mod symbol_table;

pub use symbol::{Builtin, FunctionSignature, MemoryLocation, StorageClass, Symbol, SymbolId, SymbolKind};
pub use symbol_table::{Lookup, SymbolTable, SymbolTableError};
