//! BPE vocabulary builder.
//!
//! Each word is stored as its characters joined by single spaces, followed by
//! an end-of-word marker (`"low"` becomes `"l o w _EOW"`), with the number of
//! times the word occurs in the corpus. A merge is then just a rewrite of those
//! keys. The end-of-word marker lets suffix-like units be learned separately
//! from prefixes and infixes.

use super::counter::PairCounter;
use ahash::AHashMap;
use compact_str::CompactString;
use morphon_core::{CorpusReader, MergeCandidate, MorphonError, Result, SymbolPair};
use std::path::Path;

/// Default end-of-word symbol.
pub const DEFAULT_END_OF_WORD: &str = "_EOW";

/// A vocabulary entry: space-joined symbol sequence and its frequency.
#[derive(Debug, Clone, PartialEq, Eq)]
struct VocabEntry {
    key: CompactString,
    freq: u64,
}

/// Frequency-weighted vocabulary of symbol sequences.
#[derive(Debug, Clone)]
pub struct BpeVocab {
    end_of_word: CompactString,
    /// Entries in first-seen order
    entries: Vec<VocabEntry>,
    /// Key -> position in `entries`
    index: AHashMap<CompactString, usize>,
}

impl BpeVocab {
    /// Create an empty vocabulary using [`DEFAULT_END_OF_WORD`].
    pub fn new() -> Self {
        Self {
            end_of_word: CompactString::new(DEFAULT_END_OF_WORD),
            entries: Vec::new(),
            index: AHashMap::new(),
        }
    }

    /// Create an empty vocabulary with a custom end-of-word marker.
    ///
    /// The marker must be non-empty and must not contain whitespace, since
    /// keys are split on spaces.
    pub fn with_end_of_word(marker: &str) -> Result<Self> {
        if marker.is_empty() || marker.chars().any(char::is_whitespace) {
            return Err(MorphonError::InvalidConfig(format!(
                "end-of-word marker must be non-empty and contain no whitespace, got {:?}",
                marker
            )));
        }

        Ok(Self {
            end_of_word: CompactString::new(marker),
            ..Self::new()
        })
    }

    /// Build the vocabulary from a corpus file, replacing any previous content.
    pub fn init_vocab(&mut self, corpus_path: impl AsRef<Path>) -> Result<()> {
        let lines = CorpusReader::open(corpus_path)?.collect::<Result<Vec<String>>>()?;
        self.init_vocab_from_lines(&lines);

        log::info!(
            "Initialized BPE vocabulary: {} word types, {} word occurrences",
            self.len(),
            self.word_occurrences()
        );
        Ok(())
    }

    /// Build the vocabulary from in-memory lines, replacing any previous content.
    pub fn init_vocab_from_lines<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.clear();
        for line in lines {
            self.add_line(line.as_ref());
        }
    }

    fn add_line(&mut self, line: &str) {
        for word in line.split_whitespace() {
            self.add_word(word);
        }
    }

    /// Add one occurrence of `word`.
    pub fn add_word(&mut self, word: &str) {
        let mut key = CompactString::with_capacity(word.len() * 2 + self.end_of_word.len());
        for ch in word.chars() {
            key.push(ch);
            key.push(' ');
        }
        key.push_str(&self.end_of_word);

        self.insert(key, 1);
    }

    fn insert(&mut self, key: CompactString, freq: u64) {
        match self.index.get(&key) {
            Some(&pos) => self.entries[pos].freq += freq,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push(VocabEntry { key, freq });
            }
        }
    }

    /// Propose the most frequent adjacent symbol pair.
    ///
    /// Ties are broken in favor of the pair encountered first when walking the
    /// entries in first-seen order and each entry's symbols left to right.
    pub fn get_best_candidate(&self) -> Result<MergeCandidate> {
        self.pair_counts().best().ok_or(MorphonError::NoCandidates)
    }

    /// Fresh pair counts for the current vocabulary.
    pub fn pair_counts(&self) -> PairCounter {
        PairCounter::count(self.iter())
    }

    /// Fuse every left-to-right, non-overlapping occurrence of `pair`.
    ///
    /// Returns the number of entries that changed.
    pub fn apply_merge(&mut self, pair: &SymbolPair) -> usize {
        let merged = pair.merged();
        let entries = std::mem::take(&mut self.entries);
        self.index.clear();

        let mut changed = 0;
        for entry in entries {
            let key = match merge_key(&entry.key, pair, &merged) {
                Some(key) => {
                    changed += 1;
                    key
                }
                None => entry.key,
            };
            self.insert(key, entry.freq);
        }
        changed
    }

    /// Frequency of a symbol-sequence key; 0 if absent.
    pub fn frequency(&self, key: &str) -> u64 {
        self.index.get(key).map_or(0, |&pos| self.entries[pos].freq)
    }

    /// `(key, frequency)` in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|e| (e.key.as_str(), e.freq))
    }

    /// Total frequency of every symbol across the vocabulary.
    pub fn symbol_frequencies(&self) -> AHashMap<CompactString, u64> {
        let mut counts: AHashMap<CompactString, u64> = AHashMap::new();
        for (key, freq) in self.iter() {
            for symbol in key.split(' ') {
                *counts.entry(CompactString::new(symbol)).or_insert(0) += freq;
            }
        }
        counts
    }

    /// Sum over entries of `frequency * number of symbols`.
    pub fn symbol_mass(&self) -> u64 {
        self.iter()
            .map(|(key, freq)| freq * key.split(' ').count() as u64)
            .sum()
    }

    /// Total number of word occurrences.
    pub fn word_occurrences(&self) -> u64 {
        self.entries.iter().map(|e| e.freq).sum()
    }

    #[inline]
    pub fn end_of_word(&self) -> &str {
        &self.end_of_word
    }

    /// Number of distinct keys.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }
}

impl Default for BpeVocab {
    fn default() -> Self {
        Self::new()
    }
}

/// Rewrite `key` with every occurrence of `pair` fused, or `None` if the pair
/// does not occur.
fn merge_key(key: &str, pair: &SymbolPair, merged: &str) -> Option<CompactString> {
    let symbols: Vec<&str> = key.split(' ').collect();
    let mut out: Vec<&str> = Vec::with_capacity(symbols.len());
    let mut hit = false;

    let mut i = 0;
    while i < symbols.len() {
        if i + 1 < symbols.len() && pair.matches(symbols[i], symbols[i + 1]) {
            out.push(merged);
            hit = true;
            i += 2;
        } else {
            out.push(symbols[i]);
            i += 1;
        }
    }

    hit.then(|| CompactString::from(out.join(" ")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CORPUS: [&str; 4] = [
        "123 124 234 345",
        "112 122 123 345",
        "123456789",
        "123456 456789",
    ];

    fn corpus_vocab() -> BpeVocab {
        let mut vocab = BpeVocab::new();
        vocab.init_vocab_from_lines(CORPUS);
        vocab
    }

    #[test]
    fn test_vocab_init() {
        let vocab = corpus_vocab();
        let symbols = vocab.symbol_frequencies();

        assert_eq!(vocab.len(), 9);
        assert_eq!(vocab.frequency("1 2 3 _EOW"), 2);
        assert_eq!(vocab.frequency("3 4 5 _EOW"), 2);
        assert_eq!(symbols.len(), 10);
        assert_eq!(symbols["_EOW"], 11);
        assert_eq!(symbols["3"], 7);
        assert!(!symbols.contains_key("12"));
        assert!(!symbols.contains_key("123"));
    }

    #[test]
    fn test_vocab_init_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", CORPUS.join("\n")).unwrap();

        let mut vocab = BpeVocab::new();
        vocab.init_vocab(file.path()).unwrap();

        assert_eq!(vocab.len(), 9);
        assert_eq!(vocab.word_occurrences(), 11);
        assert_eq!(vocab.symbol_frequencies()["3"], 7);
    }

    #[test]
    fn test_vocab_init_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut vocab = BpeVocab::new();

        let err = vocab.init_vocab(dir.path().join("missing.txt")).unwrap_err();
        assert!(matches!(err, MorphonError::Io { .. }));
    }

    #[test]
    fn test_vocab_init_keeps_previous_on_read_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"abc abd\nxy \xff\xfe zz\nmore\n").unwrap();

        let mut vocab = BpeVocab::new();
        vocab.init_vocab_from_lines(["old words here"]);
        let before: Vec<(String, u64)> = vocab.iter().map(|(k, f)| (k.to_string(), f)).collect();

        let err = vocab.init_vocab(file.path()).unwrap_err();
        assert!(matches!(err, MorphonError::Io { .. }));

        let after: Vec<(String, u64)> = vocab.iter().map(|(k, f)| (k.to_string(), f)).collect();
        assert_eq!(after, before);
        assert_eq!(vocab.frequency("a b c _EOW"), 0);
    }

    #[test]
    fn test_best_candidate() {
        let vocab = corpus_vocab();
        let best = vocab.get_best_candidate().unwrap();

        assert_eq!(best.pair, SymbolPair::new("1", "2"));
        assert_eq!(best.count, 7);
        assert_eq!(vocab.get_best_candidate().unwrap(), best);
    }

    #[test]
    fn test_symbol_mass() {
        let mut vocab = corpus_vocab();
        let expected: u64 = CORPUS
            .iter()
            .flat_map(|line| line.split_whitespace())
            .map(|word| word.chars().count() as u64 + 1)
            .sum();

        assert_eq!(vocab.symbol_mass(), expected);

        // Merging shrinks the symbol count but never the word count.
        vocab.apply_merge(&SymbolPair::new("1", "2"));
        assert!(vocab.symbol_mass() < expected);
        assert_eq!(vocab.word_occurrences(), 11);
    }

    #[test]
    fn test_symbol_mass_multibyte() {
        let lines = ["straße straße größe", "naïve café café café", "日本語 日本"];
        let mut vocab = BpeVocab::new();
        vocab.init_vocab_from_lines(lines);

        let expected: u64 = lines
            .iter()
            .flat_map(|line| line.split_whitespace())
            .map(|word| word.chars().count() as u64 + 1)
            .sum();
        assert_eq!(vocab.symbol_mass(), expected);
        assert_eq!(vocab.frequency("c a f é _EOW"), 3);

        let frequencies = vocab.symbol_frequencies();
        assert_eq!(frequencies.values().sum::<u64>(), expected);
        assert_eq!(frequencies["ß"], 3);
        assert_eq!(frequencies["日"], 2);

        // Fusing a repeated pair keeps the word count.
        let best = vocab.get_best_candidate().unwrap();
        vocab.apply_merge(&best.pair);
        assert_eq!(vocab.symbol_mass(), expected - best.count);
        assert_eq!(vocab.word_occurrences(), 9);
    }

    #[test]
    fn test_empty_vocab_has_no_candidates() {
        let mut vocab = BpeVocab::new();
        vocab.init_vocab_from_lines(["", "   "]);

        assert!(vocab.is_empty());
        assert!(matches!(
            vocab.get_best_candidate(),
            Err(MorphonError::NoCandidates)
        ));
    }

    #[test]
    fn test_apply_merge() {
        let mut vocab = corpus_vocab();
        let changed = vocab.apply_merge(&SymbolPair::new("1", "2"));

        assert_eq!(changed, 6);
        assert_eq!(vocab.frequency("12 3 _EOW"), 2);
        assert_eq!(vocab.frequency("1 12 _EOW"), 1);
        assert_eq!(vocab.frequency("1 2 3 _EOW"), 0);
        assert_eq!(vocab.frequency("4 5 6 7 8 9 _EOW"), 1);
        assert_eq!(vocab.len(), 9);

        // (3, 4) and (4, 5) both reach 5; (3, 4) is seen first in "2 3 4 _EOW".
        let best = vocab.get_best_candidate().unwrap();
        assert_eq!(best.pair, SymbolPair::new("3", "4"));
        assert_eq!(best.count, 5);
        assert_eq!(vocab.pair_counts().get("12", "3"), 4);
    }

    #[test]
    fn test_merge_is_non_overlapping() {
        let mut vocab = BpeVocab::new();
        vocab.init_vocab_from_lines(["aaa"]);

        vocab.apply_merge(&SymbolPair::new("a", "a"));
        assert_eq!(vocab.frequency("aa a _EOW"), 1);
    }

    #[test]
    fn test_merge_into_end_of_word() {
        let mut vocab = BpeVocab::new();
        vocab.init_vocab_from_lines(["lowest newest", "widest"]);

        vocab.apply_merge(&SymbolPair::new("t", "_EOW"));
        vocab.apply_merge(&SymbolPair::new("s", "t_EOW"));

        assert_eq!(vocab.frequency("l o w e st_EOW"), 1);
        assert_eq!(vocab.symbol_frequencies()["st_EOW"], 3);
    }

    #[test]
    fn test_custom_end_of_word() {
        let mut vocab = BpeVocab::with_end_of_word("</w>").unwrap();
        vocab.init_vocab_from_lines(["ab ab"]);

        assert_eq!(vocab.end_of_word(), "</w>");
        assert_eq!(vocab.frequency("a b </w>"), 2);

        assert!(BpeVocab::with_end_of_word("").is_err());
        assert!(BpeVocab::with_end_of_word("end word").is_err());
    }

    #[test]
    fn test_case_sensitive() {
        let mut vocab = BpeVocab::new();
        vocab.init_vocab_from_lines(["Haus haus"]);

        assert_eq!(vocab.len(), 2);
        assert_eq!(vocab.frequency("H a u s _EOW"), 1);
    }
}
