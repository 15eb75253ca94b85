//! Morphon-training - unsupervised sub-word and alignment training
//!
//! This crate provides two independent statistical learners over
//! whitespace-tokenized corpora:
//!
//! - [`BpeVocab`]: a frequency-weighted vocabulary of symbol sequences that
//!   proposes the best adjacent pair to merge, plus [`BpeTrainer`] to run the
//!   merge loop
//! - [`IbmModel1`]: IBM Translation Model 1 estimated with EM over a
//!   line-aligned parallel corpus
//!
//! # Example
//!
//! ```rust
//! use morphon_training::BpeVocab;
//!
//! let mut vocab = BpeVocab::new();
//! vocab.init_vocab_from_lines(["low lower lowest"]);
//!
//! let best = vocab.get_best_candidate()?;
//! assert_eq!(best.pair.to_string(), "l o");
//! assert_eq!(best.count, 3);
//! # Ok::<(), morphon_training::MorphonError>(())
//! ```

pub use morphon_core::{MorphonError, Result};

pub mod training;
pub use training::{
    BpeTrainer, BpeVocab, EncodedPair, Ibm1Config, IbmModel1, IterationStats, Normalization,
    PairCounter, TrainedBpe, TrainingConfig, TrainingState, DEFAULT_END_OF_WORD,
};
