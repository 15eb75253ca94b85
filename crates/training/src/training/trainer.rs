//! BPE merge loop.
//!
//! [`BpeVocab`] only proposes merges. This trainer is the caller-side policy
//! that repeatedly takes the best candidate, applies it, and stops on a merge
//! budget, a frequency floor, or when nothing is left to merge.

use super::bpe::{BpeVocab, DEFAULT_END_OF_WORD};
use morphon_core::{MergeList, MorphonError, Result};
use std::path::Path;

/// Configuration for BPE training.
#[derive(Debug, Clone)]
pub struct TrainingConfig {
    /// Maximum number of merges to learn
    pub num_merges: usize,
    /// Minimum aggregate frequency for a pair to be merged
    pub min_frequency: u64,
    /// End-of-word marker appended to every word
    pub end_of_word: String,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            num_merges: 1_000,
            min_frequency: 2,
            end_of_word: DEFAULT_END_OF_WORD.to_string(),
        }
    }
}

/// Result of a training run.
#[derive(Debug, Clone)]
pub struct TrainedBpe {
    /// Vocabulary after all merges were applied
    pub vocab: BpeVocab,
    /// Learned merges in rank order
    pub merges: MergeList,
}

/// BPE trainer.
///
/// Learns merges by iteratively fusing the most frequent adjacent pair.
pub struct BpeTrainer {
    config: TrainingConfig,
    vocab: BpeVocab,
    merges: MergeList,
}

impl BpeTrainer {
    /// Create a new trainer, validating the configuration.
    pub fn new(config: TrainingConfig) -> Result<Self> {
        if config.min_frequency == 0 {
            return Err(MorphonError::InvalidConfig(
                "min_frequency must be at least 1".to_string(),
            ));
        }
        let vocab = BpeVocab::with_end_of_word(&config.end_of_word)?;

        Ok(Self {
            config,
            vocab,
            merges: MergeList::new(),
        })
    }

    /// Create a trainer with default configuration and the given merge budget.
    pub fn with_num_merges(num_merges: usize) -> Self {
        Self {
            config: TrainingConfig {
                num_merges,
                ..Default::default()
            },
            vocab: BpeVocab::new(),
            merges: MergeList::new(),
        }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Train on a corpus file.
    pub fn train(mut self, corpus_path: impl AsRef<Path>) -> Result<TrainedBpe> {
        self.vocab.init_vocab(corpus_path)?;
        self.run_merges()
    }

    /// Train on in-memory lines.
    pub fn train_lines<I, S>(mut self, lines: I) -> Result<TrainedBpe>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.vocab.init_vocab_from_lines(lines);
        self.run_merges()
    }

    fn run_merges(mut self) -> Result<TrainedBpe> {
        while self.merges.len() < self.config.num_merges {
            let candidate = match self.vocab.get_best_candidate() {
                Ok(candidate) => candidate,
                Err(MorphonError::NoCandidates) => {
                    log::info!("No merge candidates left after {} merges", self.merges.len());
                    break;
                }
                Err(err) => return Err(err),
            };

            if candidate.count < self.config.min_frequency {
                log::info!(
                    "Best pair '{}' has count {} below min_frequency {}, stopping",
                    candidate.pair,
                    candidate.count,
                    self.config.min_frequency
                );
                break;
            }

            let changed = self.vocab.apply_merge(&candidate.pair);
            log::debug!(
                "merge {}: '{}' -> '{}' (count {}, {} entries rewritten)",
                self.merges.len(),
                candidate.pair,
                candidate.pair.merged(),
                candidate.count,
                changed
            );
            self.merges.push(candidate);
        }

        log::info!(
            "BPE training finished: {} merges, {} word types",
            self.merges.len(),
            self.vocab.len()
        );

        Ok(TrainedBpe {
            vocab: self.vocab,
            merges: self.merges,
        })
    }
}
