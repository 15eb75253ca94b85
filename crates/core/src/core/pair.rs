//! Symbol pairs and merge bookkeeping for BPE.
//!
//! Symbols are strings here, not ids: a BPE vocabulary key is a space-joined
//! symbol sequence, so a merge is a rewrite of those keys.

use ahash::AHashMap;
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An ordered pair of adjacent symbols.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SymbolPair {
    pub left: CompactString,
    pub right: CompactString,
}

impl SymbolPair {
    pub fn new(left: impl Into<CompactString>, right: impl Into<CompactString>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }

    /// The symbol produced by merging this pair.
    pub fn merged(&self) -> CompactString {
        let mut merged = CompactString::with_capacity(self.left.len() + self.right.len());
        merged.push_str(&self.left);
        merged.push_str(&self.right);
        merged
    }

    /// Check whether the pair equals `(left, right)`.
    #[inline]
    pub fn matches(&self, left: &str, right: &str) -> bool {
        self.left == left && self.right == right
    }
}

impl fmt::Display for SymbolPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.left, self.right)
    }
}

impl<L: Into<CompactString>, R: Into<CompactString>> From<(L, R)> for SymbolPair {
    fn from((left, right): (L, R)) -> Self {
        Self::new(left, right)
    }
}

/// A merge candidate: a pair and its aggregate frequency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeCandidate {
    /// The adjacent symbol pair
    pub pair: SymbolPair,
    /// Sum of the frequencies of every occurrence of the pair
    pub count: u64,
}

impl MergeCandidate {
    pub fn new(pair: SymbolPair, count: u64) -> Self {
        Self { pair, count }
    }
}

/// Ordered list of learned merges; rank = position.
#[derive(Debug, Clone, Default)]
pub struct MergeList {
    merges: Vec<MergeCandidate>,
    ranks: AHashMap<SymbolPair, u32>,
}

impl MergeList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a merge, returning its rank.
    ///
    /// A pair that was already recorded keeps its original rank.
    pub fn push(&mut self, candidate: MergeCandidate) -> u32 {
        if let Some(&rank) = self.ranks.get(&candidate.pair) {
            return rank;
        }

        let rank = self.merges.len() as u32;
        self.ranks.insert(candidate.pair.clone(), rank);
        self.merges.push(candidate);
        rank
    }

    /// Get the rank of a pair (lower = learned earlier).
    #[inline]
    pub fn rank(&self, pair: &SymbolPair) -> Option<u32> {
        self.ranks.get(pair).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.merges.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.merges.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MergeCandidate> {
        self.merges.iter()
    }

    pub fn as_slice(&self) -> &[MergeCandidate] {
        &self.merges
    }
}
