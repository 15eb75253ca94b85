//! BPE command implementation.

use clap::Parser;

/// BPE command arguments.
#[derive(Parser)]
pub struct BpeCommand {
    /// Path to the training corpus
    #[arg(short, long)]
    pub input: String,

    /// Output directory for vocab.json and merges.txt
    #[arg(short, long)]
    pub output: String,

    /// Maximum number of merges to learn
    #[arg(short, long, default_value_t = 1_000)]
    pub merges: usize,

    /// Minimum pair frequency for a merge
    #[arg(long, default_value_t = 2)]
    pub min_frequency: u64,

    /// End-of-word marker
    #[arg(long, default_value = morphon_training::DEFAULT_END_OF_WORD)]
    pub eow: String,
}

use crate::export::BpeExporter;
use anyhow::{Context, Result as AnyhowResult};
use morphon_training::{BpeTrainer, TrainingConfig};
use std::path::Path;
use std::time::Instant;

pub fn run(cmd: BpeCommand) -> AnyhowResult<()> {
    log::info!(
        "Learning up to {} merges from {} (min frequency {}, end-of-word {:?})",
        cmd.merges,
        cmd.input,
        cmd.min_frequency,
        cmd.eow
    );

    let trainer = BpeTrainer::new(TrainingConfig {
        num_merges: cmd.merges,
        min_frequency: cmd.min_frequency,
        end_of_word: cmd.eow,
    })?;

    let start = Instant::now();
    let trained = trainer
        .train(&cmd.input)
        .with_context(|| format!("failed to train BPE on {}", cmd.input))?;
    log::info!(
        "Learned {} merges in {:.2}s",
        trained.merges.len(),
        start.elapsed().as_secs_f64()
    );

    let output_path = Path::new(&cmd.output);
    BpeExporter::new(&trained.vocab, &trained.merges).save(output_path)?;
    println!(
        "Saved {} merges and {} vocabulary entries to {}",
        trained.merges.len(),
        trained.vocab.len(),
        cmd.output
    );

    Ok(())
}
