//! Sparse translation-probability table.
//!
//! `P(source | target)` is stored as one adjacency list per target token. Rows
//! and the entries inside a row are kept in discovery order, and only pairs
//! that co-occurred in the corpus ever get an entry, so normalization is a
//! bounded loop over observed entries.

use super::symbols::SymbolId;
use crate::error::{MorphonError, Result};
use ahash::AHashMap;

/// Interned source-token id.
pub type SourceId = SymbolId;

/// Outer key of the table: a target token id or the null-alignment marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TargetKey {
    /// Unaligned source words are generated by the null target.
    Null,
    Word(SymbolId),
}

/// Borrowed, string-level view of a target token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target<'a> {
    Null,
    Word(&'a str),
}

impl<'a> Target<'a> {
    pub fn word(token: &'a str) -> Self {
        Target::Word(token)
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Target::Null)
    }
}

/// One target's distribution over source tokens.
#[derive(Debug, Clone)]
pub struct TableRow {
    target: TargetKey,
    sources: Vec<SourceId>,
    probs: Vec<f64>,
    slots: AHashMap<SourceId, usize>,
}

impl TableRow {
    fn new(target: TargetKey) -> Self {
        Self {
            target,
            sources: Vec::new(),
            probs: Vec::new(),
            slots: AHashMap::new(),
        }
    }

    /// Record an observed source. Returns false if it was already present.
    fn observe(&mut self, source: SourceId) -> bool {
        if self.slots.contains_key(&source) {
            return false;
        }
        self.slots.insert(source, self.sources.len());
        self.sources.push(source);
        self.probs.push(0.0);
        true
    }

    #[inline]
    pub fn target(&self) -> TargetKey {
        self.target
    }

    /// Position of `source` within this row.
    #[inline]
    pub fn slot(&self, source: SourceId) -> Option<usize> {
        self.slots.get(&source).copied()
    }

    /// Probability of `source` given this row's target; 0 when unobserved.
    #[inline]
    pub fn prob(&self, source: SourceId) -> f64 {
        self.slot(source).map_or(0.0, |slot| self.probs[slot])
    }

    #[inline]
    pub fn prob_at(&self, slot: usize) -> f64 {
        self.probs[slot]
    }

    /// `(source, probability)` in discovery order.
    pub fn entries(&self) -> impl Iterator<Item = (SourceId, f64)> + '_ {
        self.sources.iter().copied().zip(self.probs.iter().copied())
    }

    pub fn total(&self) -> f64 {
        self.probs.iter().sum()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

/// Sparse `|targets| x |sources|` probability matrix.
#[derive(Debug, Clone, Default)]
pub struct TranslationTable {
    index: AHashMap<TargetKey, usize>,
    rows: Vec<TableRow>,
}

impl TranslationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `source` co-occurred with `target`.
    ///
    /// The new entry has probability 0 until [`normalize_uniform`] runs.
    ///
    /// [`normalize_uniform`]: TranslationTable::normalize_uniform
    pub fn observe(&mut self, target: TargetKey, source: SourceId) -> bool {
        let row = match self.index.get(&target) {
            Some(&row) => row,
            None => {
                let row = self.rows.len();
                self.index.insert(target, row);
                self.rows.push(TableRow::new(target));
                row
            }
        };
        self.rows[row].observe(source)
    }

    /// Give every row a uniform distribution over its observed sources.
    pub fn normalize_uniform(&mut self) {
        for row in &mut self.rows {
            let uniform = 1.0 / row.len() as f64;
            row.probs.iter_mut().for_each(|p| *p = uniform);
        }
    }

    /// Position of `target`'s row.
    #[inline]
    pub fn row_index(&self, target: TargetKey) -> Option<usize> {
        self.index.get(&target).copied()
    }

    pub fn row(&self, target: TargetKey) -> Option<&TableRow> {
        self.row_index(target).map(|row| &self.rows[row])
    }

    /// Rows in discovery order.
    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    /// `P(source | target)`; 0 for pairs that never co-occurred.
    pub fn prob(&self, target: TargetKey, source: SourceId) -> f64 {
        self.row(target).map_or(0.0, |row| row.prob(source))
    }

    /// Number of rows (targets with at least one observed source).
    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Total number of observed (target, source) entries.
    pub fn entry_count(&self) -> usize {
        self.rows.iter().map(TableRow::len).sum()
    }

    /// A zeroed accumulator shaped like this table.
    pub fn zeroed_counts(&self) -> ExpectedCounts {
        ExpectedCounts {
            rows: self.rows.iter().map(|row| vec![0.0; row.len()]).collect(),
        }
    }

    /// Check that `counts` was shaped by this table (same rows, same entries per row).
    pub fn check_counts(&self, counts: &ExpectedCounts) -> Result<()> {
        if counts.rows.len() != self.rows.len() {
            return Err(MorphonError::CountsMismatch {
                reason: format!(
                    "accumulator has {} rows, table has {}",
                    counts.rows.len(),
                    self.rows.len()
                ),
            });
        }
        match self
            .rows
            .iter()
            .zip(&counts.rows)
            .position(|(row, row_counts)| row.len() != row_counts.len())
        {
            Some(idx) => Err(MorphonError::CountsMismatch {
                reason: format!(
                    "row {} has {} accumulator slots, table has {} entries",
                    idx,
                    counts.rows[idx].len(),
                    self.rows[idx].len()
                ),
            }),
            None => Ok(()),
        }
    }

    /// M-step: replace every row by its normalized expected counts.
    ///
    /// Rows that accumulated no mass become all zeros. Returns the number of
    /// such rows. The table is left untouched if `counts` has another shape.
    pub fn maximize(&mut self, counts: ExpectedCounts) -> Result<usize> {
        self.check_counts(&counts)?;

        let mut empty_rows = 0;
        for (row, row_counts) in self.rows.iter_mut().zip(counts.rows) {
            let total: f64 = row_counts.iter().sum();
            if total > 0.0 {
                for (p, count) in row.probs.iter_mut().zip(row_counts) {
                    *p = count / total;
                }
            } else {
                row.probs.iter_mut().for_each(|p| *p = 0.0);
                empty_rows += 1;
            }
        }
        Ok(empty_rows)
    }

    pub fn clear(&mut self) {
        self.index.clear();
        self.rows.clear();
    }
}

/// Fractional alignment counts for one EM iteration.
///
/// Indexed by `(row, slot)` of the table that created it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpectedCounts {
    rows: Vec<Vec<f64>>,
}

impl ExpectedCounts {
    #[inline]
    pub fn add(&mut self, row: usize, slot: usize, value: f64) {
        self.rows[row][slot] += value;
    }

    #[inline]
    pub fn get(&self, row: usize, slot: usize) -> f64 {
        self.rows
            .get(row)
            .and_then(|r| r.get(slot))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn row_total(&self, row: usize) -> f64 {
        self.rows.get(row).map_or(0.0, |r| r.iter().sum())
    }

    /// Total accumulated mass across all rows.
    pub fn total(&self) -> f64 {
        self.rows.iter().flatten().sum()
    }

    /// Sum another accumulator of the same table into this one.
    pub fn absorb(&mut self, other: ExpectedCounts) -> Result<()> {
        let same_shape = self.rows.len() == other.rows.len()
            && self.rows.iter().zip(&other.rows).all(|(a, b)| a.len() == b.len());
        if !same_shape {
            return Err(MorphonError::CountsMismatch {
                reason: "accumulators come from differently shaped tables".to_string(),
            });
        }
        for (mine, theirs) in self.rows.iter_mut().zip(other.rows) {
            for (a, b) in mine.iter_mut().zip(theirs) {
                *a += b;
            }
        }
        Ok(())
    }
}
