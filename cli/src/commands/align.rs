//! Align command implementation.

use clap::{Parser, ValueEnum};

/// Expectation normalization choices.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum NormalizationArg {
    PerTarget,
    PerSource,
}

/// Output formats for the translation table.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TableFormat {
    Tsv,
    Json,
}

/// Align command arguments.
#[derive(Parser)]
pub struct AlignCommand {
    /// Source-language corpus
    #[arg(short, long)]
    pub source: String,

    /// Target-language corpus, line-aligned with the source
    #[arg(short, long)]
    pub target: String,

    /// Output file for the translation table
    #[arg(short, long)]
    pub output: String,

    /// Number of EM iterations
    #[arg(short, long, default_value_t = 5)]
    pub iterations: usize,

    /// Only write entries with probability above this value
    #[arg(long, default_value_t = 0.0)]
    pub threshold: f64,

    /// Expectation normalization
    #[arg(long, value_enum, default_value = "per-target")]
    pub normalization: NormalizationArg,

    /// Output format
    #[arg(long, value_enum, default_value = "tsv")]
    pub format: TableFormat,

    /// Label printed for the null target
    #[arg(long, default_value = "<null>")]
    pub null_label: String,
}

use crate::export::TableExporter;
use anyhow::{Context, Result as AnyhowResult};
use morphon_training::{Ibm1Config, IbmModel1, Normalization};
use std::path::Path;
use std::time::Instant;

impl From<NormalizationArg> for Normalization {
    fn from(arg: NormalizationArg) -> Self {
        match arg {
            NormalizationArg::PerTarget => Normalization::PerTarget,
            NormalizationArg::PerSource => Normalization::PerSource,
        }
    }
}

pub fn run(cmd: AlignCommand) -> AnyhowResult<()> {
    let mut model = IbmModel1::new(Ibm1Config {
        iterations: cmd.iterations,
        normalization: cmd.normalization.into(),
    });

    let start = Instant::now();
    let history = model
        .train(&cmd.source, &cmd.target)
        .with_context(|| format!("failed to train on {} / {}", cmd.source, cmd.target))?;
    log::info!(
        "Trained {} EM iterations in {:.2}s",
        history.len(),
        start.elapsed().as_secs_f64()
    );

    let exporter = TableExporter::new(&model, &cmd.null_label, cmd.threshold);
    let output_path = Path::new(&cmd.output);
    let written = match cmd.format {
        TableFormat::Tsv => exporter.save_tsv(output_path)?,
        TableFormat::Json => exporter.save_json(output_path)?,
    };
    println!("Wrote {} translation entries to {}", written, cmd.output);

    Ok(())
}
