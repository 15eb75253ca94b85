//! Morphon-core - shared data structures for unsupervised morphology
//!
//! This crate provides the building blocks used by `morphon-training`:
//!
//! - Token interning with `AHashMap` and compact strings
//! - Symbol pairs, merge candidates and ordered merge lists for BPE
//! - A sparse translation-probability table with a tagged null target
//! - Line-aligned corpus readers
//! - Error handling with file context
//!
//! # Example
//!
//! ```rust
//! use morphon_core::{TargetKey, TranslationTable};
//!
//! let mut table = TranslationTable::new();
//! table.observe(TargetKey::Word(0), 0);
//! table.observe(TargetKey::Null, 0);
//! table.normalize_uniform();
//! assert_eq!(table.prob(TargetKey::Null, 0), 1.0);
//! ```

pub mod error;
pub use error::{MorphonError, Result};

pub mod core;
pub use core::{
    ExpectedCounts, MergeCandidate, MergeList, SourceId, SymbolId, SymbolPair, SymbolTable,
    TableRow, Target, TargetKey, TranslationTable,
};

pub mod corpus;
pub use corpus::{distinct_tokens, CorpusReader, ParallelCorpus, SentencePair};
