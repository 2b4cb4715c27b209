use log::{debug, trace};
use thiserror::Error;

use super::symbol::{Symbol, SymbolId};

/// Number of hash chains.
const SIZE: usize = 211;

/// Power of two used as multiplier in the hash function.
const SHIFT: u32 = 4;

pub const DEFAULT_MAX_SCOPE_DEPTH: usize = 100;

fn hash(key: &str) -> usize {
    key.bytes()
        .fold(0, |temp, byte| ((temp << SHIFT) + byte as usize) % SIZE)
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SymbolTableError {
    #[error("scope nesting exceeds the limit of {limit} levels")]
    ScopeTooDeep { limit: usize },
    #[error("cannot pop the global scope")]
    PopGlobalScope,
    #[error("{name:?} is already declared in this scope")]
    AlreadyDeclared { name: String, previous: SymbolId },
}

/// Result of a successful `resolve`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lookup {
    pub id: SymbolId,
    /// Whether the match was declared in the innermost open scope.
    pub in_current_scope: bool,
}

#[derive(Debug, Clone)]
struct BucketEntry {
    id: SymbolId,
    depth: usize,
}

/// Chained hash table with scope push/pop.
///
/// Each chain keeps its most recent declaration last, so the innermost
/// binding of a name is the first match when walking a chain backwards.
#[derive(Debug)]
pub struct SymbolTable {
    buckets: Vec<Vec<BucketEntry>>,
    /// Chains extended while each scope was open, one entry per insertion.
    touched: Vec<usize>,
    /// `touched.len()` at the moment each scope was opened, indexed by depth.
    scope_base: Vec<usize>,
    depth: usize,
    max_depth: usize,
    symbols: Vec<Symbol>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SCOPE_DEPTH)
    }
}

impl SymbolTable {
    pub fn new(max_depth: usize) -> Self {
        SymbolTable {
            buckets: vec![Vec::new(); SIZE],
            touched: Vec::new(),
            scope_base: vec![0],
            depth: 0,
            max_depth,
            symbols: Vec::new(),
        }
    }

    /// Current scope depth; 0 is the global scope.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn push_scope(&mut self) -> Result<usize, SymbolTableError> {
        if self.depth + 1 >= self.max_depth {
            return Err(SymbolTableError::ScopeTooDeep {
                limit: self.max_depth,
            });
        }

        self.scope_base.push(self.touched.len());
        self.depth += 1;
        trace!("SymbolTable: pushed scope {}", self.depth);
        Ok(self.depth)
    }

    /// Hides every name declared in the innermost scope, making shadowed
    /// outer bindings visible again.
    pub fn pop_scope(&mut self) -> Result<usize, SymbolTableError> {
        if self.depth == 0 {
            return Err(SymbolTableError::PopGlobalScope);
        }

        let base = self.scope_base.pop().unwrap_or(0);
        let mut released = 0;
        for &bucket in &self.touched[base..] {
            let chain = &mut self.buckets[bucket];
            while chain.last().map_or(false, |head| head.depth >= self.depth) {
                chain.pop();
                released += 1;
            }
        }
        self.touched.truncate(base);

        trace!(
            "SymbolTable: popped scope {} ({} names released)",
            self.depth,
            released
        );
        self.depth -= 1;
        Ok(self.depth)
    }

    /// Declares `symbol` in the current scope.
    ///
    /// Fails only if the same name is already declared in the current scope;
    /// a declaration in an outer scope is shadowed instead.
    pub fn declare(&mut self, mut symbol: Symbol) -> Result<SymbolId, SymbolTableError> {
        let bucket = hash(&symbol.name);

        let existing = self.buckets[bucket]
            .iter()
            .rev()
            .take_while(|entry| entry.depth == self.depth)
            .find(|entry| self.symbols[entry.id.index()].name == symbol.name);
        if let Some(entry) = existing {
            return Err(SymbolTableError::AlreadyDeclared {
                name: symbol.name,
                previous: entry.id,
            });
        }

        let id = SymbolId(self.symbols.len() as u32);
        symbol.depth = self.depth;
        debug!(
            "SymbolTable: declared {:?} as {} at depth {}",
            symbol.name, id, self.depth
        );
        self.symbols.push(symbol);
        self.buckets[bucket].push(BucketEntry {
            id,
            depth: self.depth,
        });
        self.touched.push(bucket);

        Ok(id)
    }

    /// Finds the innermost visible declaration of `name`.
    pub fn resolve(&self, name: &str) -> Option<Lookup> {
        let found = self.buckets[hash(name)]
            .iter()
            .rev()
            .find(|entry| self.symbols[entry.id.index()].name == name);

        trace!("SymbolTable: resolve {:?} -> {:?}", name, found.map(|entry| entry.id));
        found.map(|entry| Lookup {
            id: entry.id,
            in_current_scope: entry.depth == self.depth,
        })
    }

    /// Appends `line` to the reference list of the visible binding of `name`.
    pub fn record_reference(&mut self, name: &str, line: u32) -> Option<SymbolId> {
        let lookup = self.resolve(name)?;
        self.symbols[lookup.id.index()].references.push(line);
        Some(lookup.id)
    }

    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.index())
    }

    pub fn get_mut(&mut self, id: SymbolId) -> Option<&mut Symbol> {
        self.symbols.get_mut(id.index())
    }

    /// Every symbol ever declared, including those whose scope was popped.
    pub fn symbols(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.symbols
            .iter()
            .enumerate()
            .map(|(index, symbol)| (SymbolId(index as u32), symbol))
    }
}
