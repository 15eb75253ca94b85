//! Morphon CLI - command-line interface for BPE and IBM Model 1 training.
//!
//! This is the main entry point for the `morphon` command-line tool.

mod commands;
mod export;

use clap::{Parser, Subcommand};
use commands::{AlignCommand, BpeCommand, CandidateCommand};
use env_logger::Env;
use log::LevelFilter;

#[derive(Parser)]
#[command(name = "morphon")]
#[command(about = "Unsupervised sub-word and word-alignment training", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease log verbosity (-q warn, -qq error)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    quiet: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Learn BPE merges from a corpus
    Bpe(BpeCommand),
    /// Print the best initial merge candidate of a corpus
    Candidate(CandidateCommand),
    /// Train IBM Model 1 on a line-aligned parallel corpus
    Align(AlignCommand),
}

fn init_logging(verbose: u8, quiet: u8) {
    let level = if quiet > 0 {
        match quiet {
            1 => LevelFilter::Warn,
            _ => LevelFilter::Error,
        }
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    builder.format_timestamp_millis();
    if verbose > 0 || quiet > 0 {
        builder.filter_level(level);
    }
    let _ = builder.try_init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Bpe(cmd) => commands::bpe::run(cmd)?,
        Commands::Candidate(cmd) => commands::candidate::run(cmd)?,
        Commands::Align(cmd) => commands::align::run(cmd)?,
    }

    Ok(())
}
