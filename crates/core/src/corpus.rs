//! Corpus readers.
//!
//! Corpora are UTF-8 text, one sentence per line, tokens separated by
//! whitespace. Reading is sequential and blocking.

use crate::error::{MorphonError, Result};
use compact_str::CompactString;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

/// Line-by-line reader over a corpus file.
///
/// I/O failures are reported with the file path attached.
pub struct CorpusReader {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
}

impl CorpusReader {
    /// Open a corpus file for reading.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| MorphonError::io(&path, e))?;

        Ok(Self {
            path,
            lines: BufReader::new(file).lines(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Iterator for CorpusReader {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.lines
            .next()
            .map(|line| line.map_err(|e| MorphonError::io(&self.path, e)))
    }
}

/// Distinct whitespace-delimited tokens of a line, in first-occurrence order.
pub fn distinct_tokens(line: &str) -> Vec<CompactString> {
    let mut tokens: Vec<CompactString> = Vec::new();
    for token in line.split_whitespace() {
        if !tokens.iter().any(|t| t == token) {
            tokens.push(CompactString::new(token));
        }
    }
    tokens
}

/// A tokenized sentence pair: line *i* of the source and target corpora.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentencePair {
    pub source: Vec<CompactString>,
    pub target: Vec<CompactString>,
}

/// Two line-aligned corpora loaded into memory.
#[derive(Debug, Clone, Default)]
pub struct ParallelCorpus {
    pairs: Vec<SentencePair>,
}

impl ParallelCorpus {
    /// Load a source and a target corpus, pairing them line by line.
    ///
    /// Both files are read to the end before returning, so a line-count
    /// mismatch is reported before anything is computed from the pairs.
    pub fn load(source_path: impl AsRef<Path>, target_path: impl AsRef<Path>) -> Result<Self> {
        let sources = CorpusReader::open(source_path)?;
        let targets = CorpusReader::open(target_path)?;

        let source_lines = sources
            .map(|line| line.map(|l| distinct_tokens(&l)))
            .collect::<Result<Vec<_>>>()?;
        let target_lines = targets
            .map(|line| line.map(|l| distinct_tokens(&l)))
            .collect::<Result<Vec<_>>>()?;

        Self::from_tokenized(source_lines, target_lines)
    }

    /// Pair in-memory lines.
    pub fn from_lines<S: AsRef<str>, T: AsRef<str>>(source: &[S], target: &[T]) -> Result<Self> {
        Self::from_tokenized(
            source.iter().map(|l| distinct_tokens(l.as_ref())).collect(),
            target.iter().map(|l| distinct_tokens(l.as_ref())).collect(),
        )
    }

    fn from_tokenized(
        source: Vec<Vec<CompactString>>,
        target: Vec<Vec<CompactString>>,
    ) -> Result<Self> {
        if source.len() != target.len() {
            return Err(MorphonError::CorpusMismatch {
                source_lines: source.len(),
                target_lines: target.len(),
            });
        }

        let pairs = source
            .into_iter()
            .zip(target)
            .map(|(source, target)| SentencePair { source, target })
            .collect();

        Ok(Self { pairs })
    }

    pub fn pairs(&self) -> &[SentencePair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
