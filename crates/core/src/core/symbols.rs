//! Token interning.
//!
//! This module maps corpus tokens to dense `u32` ids so the translation table
//! can store integer keys. Ids are handed out in first-seen order, which keeps
//! every traversal over interned tokens deterministic.

use ahash::AHashMap;
use compact_str::CompactString;

/// Interned token id.
pub type SymbolId = u32;

/// Forward mapping: token string -> ID
pub type SymbolMap = AHashMap<CompactString, SymbolId>;

/// Bidirectional token <-> id table.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    /// Forward mapping: token string -> ID
    ids: SymbolMap,
    /// Reverse mapping: ID -> token string (index = ID)
    symbols: Vec<CompactString>,
}

impl SymbolTable {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new table with capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ids: SymbolMap::with_capacity(capacity),
            symbols: Vec::with_capacity(capacity),
        }
    }

    /// Intern a token, returning its id.
    ///
    /// Interning an already known token returns the existing id.
    pub fn intern(&mut self, token: &str) -> SymbolId {
        if let Some(&id) = self.ids.get(token) {
            return id;
        }

        let id = self.symbols.len() as SymbolId;
        let token = CompactString::new(token);
        self.symbols.push(token.clone());
        self.ids.insert(token, id);
        id
    }

    /// Get the id for a token string.
    #[inline]
    pub fn get_id(&self, token: &str) -> Option<SymbolId> {
        self.ids.get(token).copied()
    }

    /// Get the token string for an id.
    #[inline]
    pub fn get_symbol(&self, id: SymbolId) -> Option<&str> {
        self.symbols.get(id as usize).map(|s| s.as_str())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Iterate over `(id, token)` in id order.
    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &str)> {
        self.symbols
            .iter()
            .enumerate()
            .map(|(id, s)| (id as SymbolId, s.as_str()))
    }

    pub fn clear(&mut self) {
        self.ids.clear();
        self.symbols.clear();
    }
}
