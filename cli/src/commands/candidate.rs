//! Candidate command implementation.

use clap::Parser;

/// Candidate command arguments.
#[derive(Parser)]
pub struct CandidateCommand {
    /// Path to the corpus
    #[arg(short, long)]
    pub input: String,

    /// End-of-word marker
    #[arg(long, default_value = morphon_training::DEFAULT_END_OF_WORD)]
    pub eow: String,
}

use anyhow::{Context, Result as AnyhowResult};
use morphon_training::BpeVocab;

pub fn run(cmd: CandidateCommand) -> AnyhowResult<()> {
    let mut vocab = BpeVocab::with_end_of_word(&cmd.eow)?;
    vocab
        .init_vocab(&cmd.input)
        .with_context(|| format!("failed to read {}", cmd.input))?;

    let best = vocab.get_best_candidate()?;
    println!("{}\t{}", best.pair, best.count);

    Ok(())
}
