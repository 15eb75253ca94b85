//! Core data structures.
//!
//! This module contains the data structures shared by the BPE builder and
//! the IBM Model 1 aligner, independent of either training algorithm.

pub mod pair;
pub mod symbols;
pub mod table;

pub use pair::{MergeCandidate, MergeList, SymbolPair};
pub use symbols::{SymbolId, SymbolMap, SymbolTable};
pub use table::{ExpectedCounts, SourceId, TableRow, Target, TargetKey, TranslationTable};
