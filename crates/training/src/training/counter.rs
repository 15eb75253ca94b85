//! Pair counting for BPE candidate selection.
//!
//! Counts are derived fresh from a vocabulary on every query and never kept
//! between queries. Each pair remembers when it was first encountered so the
//! winner among equally frequent pairs is stable for a given vocabulary.

use ahash::AHashMap;
use morphon_core::{MergeCandidate, SymbolPair};

/// Counter for adjacent symbol pair frequencies.
#[derive(Debug, Default)]
pub struct PairCounter {
    /// Pair -> position in `pairs`
    index: AHashMap<SymbolPair, usize>,
    /// (pair, frequency) in first-seen order
    pairs: Vec<(SymbolPair, u64)>,
}

impl PairCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count every adjacent pair across `(key, frequency)` vocabulary entries.
    pub fn count<'a>(entries: impl IntoIterator<Item = (&'a str, u64)>) -> Self {
        let mut counter = Self::new();
        for (key, freq) in entries {
            counter.add_entry(key, freq);
        }
        counter
    }

    /// Add one vocabulary entry: each adjacent pair of its space-separated
    /// symbols gains `freq`.
    pub fn add_entry(&mut self, key: &str, freq: u64) {
        let symbols: Vec<&str> = key.split(' ').collect();

        for window in symbols.windows(2) {
            let pair = SymbolPair::new(window[0], window[1]);
            match self.index.get(&pair) {
                Some(&pos) => self.pairs[pos].1 += freq,
                None => {
                    self.index.insert(pair.clone(), self.pairs.len());
                    self.pairs.push((pair, freq));
                }
            }
        }
    }

    /// The most frequent pair; ties go to the pair encountered first.
    pub fn best(&self) -> Option<MergeCandidate> {
        let mut best: Option<&(SymbolPair, u64)> = None;
        for entry in &self.pairs {
            if best.map_or(true, |b| entry.1 > b.1) {
                best = Some(entry);
            }
        }
        best.map(|(pair, count)| MergeCandidate::new(pair.clone(), *count))
    }

    /// Aggregate frequency of `(left, right)`.
    pub fn get(&self, left: &str, right: &str) -> u64 {
        self.index
            .get(&SymbolPair::new(left, right))
            .map_or(0, |&pos| self.pairs[pos].1)
    }

    /// `(pair, frequency)` in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&SymbolPair, u64)> {
        self.pairs.iter().map(|(pair, count)| (pair, *count))
    }

    /// Number of distinct pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn clear(&mut self) {
        self.index.clear();
        self.pairs.clear();
    }
}
