//! Training algorithms.
//!
//! This module provides the BPE vocabulary builder with its merge loop, and
//! the IBM Model 1 EM aligner.

pub mod bpe;
pub mod counter;
pub mod ibm1;
pub mod trainer;

pub use bpe::{BpeVocab, DEFAULT_END_OF_WORD};
pub use counter::PairCounter;
pub use ibm1::{
    EncodedPair, Ibm1Config, IbmModel1, IterationStats, Normalization, TrainingState,
};
pub use trainer::{BpeTrainer, TrainedBpe, TrainingConfig};
