//! Writing trained artifacts to disk.
//!
//! The training crates define no persisted format; the CLI dumps a BPE run as
//! `vocab.json` (key -> frequency) + `merges.txt` and an IBM Model 1 table as tab-separated
//! records or a JSON document.

use anyhow::{Context, Result as AnyhowResult};
use morphon_core::{MergeList, Target};
use morphon_training::{BpeVocab, IbmModel1};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// One translation-table entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRecord {
    pub target: String,
    pub source: String,
    pub probability: f64,
}

/// JSON table layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializedTable {
    /// Format version
    pub version: String,
    pub null_label: String,
    pub iterations: usize,
    pub entries: Vec<TableRecord>,
}

fn create_file(path: &Path) -> AnyhowResult<BufWriter<File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}

/// Saves a BPE vocabulary and its merges.
pub struct BpeExporter<'a> {
    vocab: &'a BpeVocab,
    merges: &'a MergeList,
}

impl<'a> BpeExporter<'a> {
    pub fn new(vocab: &'a BpeVocab, merges: &'a MergeList) -> Self {
        Self { vocab, merges }
    }

    /// Write `vocab.json` and `merges.txt` into the `dir` directory.
    pub fn save(&self, dir: &Path) -> AnyhowResult<()> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create directory {}", dir.display()))?;

        let vocab_writer = create_file(&dir.join("vocab.json"))?;
        serde_json::to_writer_pretty(vocab_writer, &self.vocab_map())
            .context("failed to serialize vocabulary")?;

        let mut merges_writer = create_file(&dir.join("merges.txt"))?;
        for merge in self.merges.iter() {
            writeln!(merges_writer, "{}", merge.pair).context("failed to write merges")?;
        }
        merges_writer.flush().context("failed to write merges")?;

        Ok(())
    }

    /// Space-joined symbol sequence -> frequency, sorted by key.
    pub fn vocab_map(&self) -> BTreeMap<String, u64> {
        self.vocab
            .iter()
            .map(|(key, frequency)| (key.to_string(), frequency))
            .collect()
    }
}

/// Saves an IBM Model 1 translation table.
pub struct TableExporter<'a> {
    model: &'a IbmModel1,
    null_label: &'a str,
    threshold: f64,
}

impl<'a> TableExporter<'a> {
    pub fn new(model: &'a IbmModel1, null_label: &'a str, threshold: f64) -> Self {
        Self {
            model,
            null_label,
            threshold,
        }
    }

    /// Entries with probability above the threshold, in table order.
    pub fn records(&self) -> Vec<TableRecord> {
        self.model
            .entries()
            .filter(|&(_, _, p)| p > self.threshold)
            .map(|(target, source, probability)| TableRecord {
                target: match target {
                    Target::Null => self.null_label.to_string(),
                    Target::Word(word) => word.to_string(),
                },
                source: source.to_string(),
                probability,
            })
            .collect()
    }

    /// Write `target<TAB>source<TAB>probability` lines. Returns the number written.
    pub fn save_tsv(&self, path: &Path) -> AnyhowResult<usize> {
        let records = self.records();
        let mut writer = create_file(path)?;
        for record in &records {
            writeln!(
                writer,
                "{}\t{}\t{}",
                record.target, record.source, record.probability
            )
            .with_context(|| format!("failed to write {}", path.display()))?;
        }
        writer
            .flush()
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(records.len())
    }

    /// Write the table as a JSON document. Returns the number of entries.
    pub fn save_json(&self, path: &Path) -> AnyhowResult<usize> {
        let table = SerializedTable {
            version: env!("CARGO_PKG_VERSION").to_string(),
            null_label: self.null_label.to_string(),
            iterations: self.model.state().iterations(),
            entries: self.records(),
        };
        let count = table.entries.len();

        let writer = create_file(path)?;
        serde_json::to_writer_pretty(writer, &table).context("failed to serialize table")?;
        Ok(count)
    }
}
