//! CLI commands for morphon.

pub mod align;
pub mod bpe;
pub mod candidate;

pub use align::AlignCommand;
pub use bpe::BpeCommand;
pub use candidate::CandidateCommand;
