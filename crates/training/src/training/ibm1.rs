//! IBM Translation Model 1 trained with Expectation-Maximization.
//!
//! The model estimates `P(source | target)` from a line-aligned parallel
//! corpus. Every target sentence is implicitly extended with a null target so
//! that source words without a counterpart have somewhere to align.
//!
//! Training moves through `Uninitialized -> Initialized -> Converging(n) ->
//! Done(n)`:
//!
//! 1. [`IbmModel1::initialize_translation_probs`] scans the corpora once and
//!    gives every co-occurring (target, source) pair a uniform probability.
//! 2. [`IbmModel1::em_step`] runs one full EM iteration: an expectation pass
//!    over every sentence pair into a fresh [`ExpectedCounts`], then a single
//!    normalization of the table.
//! 3. [`IbmModel1::learn_ibm_parameters`] does (1) once and (2) a fixed
//!    number of times. There is no convergence test.
//!
//! # Example
//!
//! ```rust
//! use morphon_core::{ParallelCorpus, Target};
//! use morphon_training::IbmModel1;
//!
//! let corpus = ParallelCorpus::from_lines(
//!     &["das haus", "das buch", "ein buch"],
//!     &["the house", "the book", "a book"],
//! )?;
//!
//! let mut model = IbmModel1::default();
//! model.initialize_from_corpus(&corpus);
//! for _ in 0..10 {
//!     model.em_step_corpus(&corpus)?;
//! }
//!
//! assert!(model.probability(Target::word("the"), "das") > 0.99);
//! # Ok::<(), morphon_core::MorphonError>(())
//! ```

use morphon_core::{
    ExpectedCounts, MorphonError, ParallelCorpus, Result, SentencePair, SourceId, SymbolTable,
    TableRow, Target, TargetKey, TranslationTable,
};
use std::path::Path;

/// How the expectation pass turns probabilities into fractional counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Normalization {
    /// For each target, `p(s|t)` is normalized over the sentence's sources.
    #[default]
    PerTarget,
    /// For each source, `p(s|t)` is normalized over the sentence's targets,
    /// null included (the Brown et al. posterior).
    PerSource,
}

/// Configuration for IBM Model 1 training.
#[derive(Debug, Clone)]
pub struct Ibm1Config {
    /// Number of EM iterations run by [`IbmModel1::train`]
    pub iterations: usize,
    /// Expectation normalization
    pub normalization: Normalization,
}

impl Default for Ibm1Config {
    fn default() -> Self {
        Self {
            iterations: 5,
            normalization: Normalization::PerTarget,
        }
    }
}

/// Where the model is in its training lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingState {
    Uninitialized,
    Initialized,
    Converging { iterations: usize },
    Done { iterations: usize },
}

impl TrainingState {
    /// Number of completed EM iterations.
    pub fn iterations(&self) -> usize {
        match *self {
            TrainingState::Uninitialized | TrainingState::Initialized => 0,
            TrainingState::Converging { iterations } | TrainingState::Done { iterations } => {
                iterations
            }
        }
    }
}

/// Summary of one EM iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationStats {
    /// 1-based iteration number
    pub iteration: usize,
    /// Sentence pairs visited by the expectation pass
    pub sentence_pairs: usize,
    /// Log-likelihood of the source side under the table before the update
    pub log_likelihood: f64,
    /// Rows that accumulated no mass and were zeroed
    pub empty_rows: usize,
}

/// A sentence pair encoded to table ids. `targets` ends with the null target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPair {
    pub targets: Vec<TargetKey>,
    pub sources: Vec<SourceId>,
}

/// IBM Model 1 aligner.
pub struct IbmModel1 {
    config: Ibm1Config,
    sources: SymbolTable,
    targets: SymbolTable,
    table: TranslationTable,
    state: TrainingState,
}

impl IbmModel1 {
    pub fn new(config: Ibm1Config) -> Self {
        Self {
            config,
            sources: SymbolTable::new(),
            targets: SymbolTable::new(),
            table: TranslationTable::new(),
            state: TrainingState::Uninitialized,
        }
    }

    pub fn config(&self) -> &Ibm1Config {
        &self.config
    }

    pub fn state(&self) -> TrainingState {
        self.state
    }

    pub fn table(&self) -> &TranslationTable {
        &self.table
    }

    pub fn source_symbols(&self) -> &SymbolTable {
        &self.sources
    }

    pub fn target_symbols(&self) -> &SymbolTable {
        &self.targets
    }

    /// Build the uniform initial table from two line-aligned corpora.
    ///
    /// `dst_path` is the target side (outer key, extended with null),
    /// `src_path` the source side.
    pub fn initialize_translation_probs(
        &mut self,
        src_path: impl AsRef<Path>,
        dst_path: impl AsRef<Path>,
    ) -> Result<()> {
        let corpus = ParallelCorpus::load(src_path, dst_path)?;
        self.initialize_from_corpus(&corpus);
        Ok(())
    }

    /// Build the uniform initial table from an in-memory corpus.
    pub fn initialize_from_corpus(&mut self, corpus: &ParallelCorpus) {
        self.sources.clear();
        self.targets.clear();
        self.table.clear();

        for pair in corpus.pairs() {
            if pair.source.is_empty() {
                continue;
            }

            let sources: Vec<SourceId> =
                pair.source.iter().map(|s| self.sources.intern(s)).collect();
            let targets: Vec<TargetKey> = pair
                .target
                .iter()
                .map(|t| TargetKey::Word(self.targets.intern(t)))
                .chain(std::iter::once(TargetKey::Null))
                .collect();

            for &target in &targets {
                for &source in &sources {
                    self.table.observe(target, source);
                }
            }
        }

        self.table.normalize_uniform();
        self.state = TrainingState::Initialized;

        log::info!(
            "Initialized translation table: {} sentence pairs, {} target rows, {} source types, {} entries",
            corpus.len(),
            self.table.len(),
            self.sources.len(),
            self.table.entry_count()
        );
    }

    /// Encode a tokenized pair; unknown tokens are dropped, null is appended.
    pub fn encode_pair(&self, pair: &SentencePair) -> EncodedPair {
        self.pair_from_tokens(&pair.target, &pair.source)
    }

    /// Encode string tokens for [`e_step`](IbmModel1::e_step).
    pub fn pair_from_tokens<T: AsRef<str>, S: AsRef<str>>(
        &self,
        targets: &[T],
        sources: &[S],
    ) -> EncodedPair {
        let targets = targets
            .iter()
            .filter_map(|t| self.targets.get_id(t.as_ref()).map(TargetKey::Word))
            .chain(std::iter::once(TargetKey::Null))
            .collect();
        let sources = sources
            .iter()
            .filter_map(|s| self.sources.get_id(s.as_ref()))
            .collect();

        EncodedPair { targets, sources }
    }

    /// Expectation for one sentence pair.
    ///
    /// Adds the expected fractional alignment counts under the current table
    /// to `counts`. `targets` should already contain the null target. The
    /// table itself is never modified.
    ///
    /// `counts` must come from [`TranslationTable::zeroed_counts`] on the
    /// current table; an accumulator from an earlier initialization is
    /// rejected with [`MorphonError::CountsMismatch`].
    pub fn e_step(
        &self,
        targets: &[TargetKey],
        sources: &[SourceId],
        counts: &mut ExpectedCounts,
    ) -> Result<()> {
        self.table.check_counts(counts)?;
        self.accumulate(targets, sources, counts);
        Ok(())
    }

    fn accumulate(&self, targets: &[TargetKey], sources: &[SourceId], counts: &mut ExpectedCounts) {
        let rows: Vec<(usize, &TableRow)> = targets
            .iter()
            .filter_map(|&t| {
                self.table
                    .row_index(t)
                    .map(|idx| (idx, &self.table.rows()[idx]))
            })
            .collect();

        match self.config.normalization {
            Normalization::PerTarget => {
                for &(idx, row) in &rows {
                    let slots: Vec<usize> = sources.iter().filter_map(|&s| row.slot(s)).collect();
                    let denom: f64 = slots.iter().map(|&slot| row.prob_at(slot)).sum();
                    if denom <= 0.0 {
                        continue;
                    }
                    for slot in slots {
                        counts.add(idx, slot, row.prob_at(slot) / denom);
                    }
                }
            }
            Normalization::PerSource => {
                for &source in sources {
                    let denom: f64 = rows.iter().map(|(_, row)| row.prob(source)).sum();
                    if denom <= 0.0 {
                        continue;
                    }
                    for &(idx, row) in &rows {
                        if let Some(slot) = row.slot(source) {
                            counts.add(idx, slot, row.prob_at(slot) / denom);
                        }
                    }
                }
            }
        }
    }

    /// `Σ_s ln(Σ_t p(s|t) / |targets|)` over sources with non-zero mass.
    fn log_likelihood(&self, pair: &EncodedPair) -> f64 {
        if pair.targets.is_empty() {
            return 0.0;
        }
        let norm = pair.targets.len() as f64;

        pair.sources
            .iter()
            .map(|&s| {
                pair.targets
                    .iter()
                    .map(|&t| self.table.prob(t, s))
                    .sum::<f64>()
            })
            .filter(|&mass| mass > 0.0)
            .map(|mass| (mass / norm).ln())
            .sum()
    }

    /// One full EM iteration over the corpora on disk.
    pub fn em_step(
        &mut self,
        src_path: impl AsRef<Path>,
        dst_path: impl AsRef<Path>,
    ) -> Result<IterationStats> {
        self.ensure_initialized()?;
        let corpus = ParallelCorpus::load(src_path, dst_path)?;
        self.em_step_corpus(&corpus)
    }

    /// One full EM iteration over an in-memory corpus.
    ///
    /// The table is only updated after every pair has been visited.
    pub fn em_step_corpus(&mut self, corpus: &ParallelCorpus) -> Result<IterationStats> {
        self.ensure_initialized()?;

        let mut counts = self.table.zeroed_counts();
        let mut log_likelihood = 0.0;
        for pair in corpus.pairs() {
            let encoded = self.encode_pair(pair);
            log_likelihood += self.log_likelihood(&encoded);
            self.accumulate(&encoded.targets, &encoded.sources, &mut counts);
        }

        let empty_rows = self.table.maximize(counts)?;
        let iteration = self.state.iterations() + 1;
        self.state = TrainingState::Converging {
            iterations: iteration,
        };

        let stats = IterationStats {
            iteration,
            sentence_pairs: corpus.len(),
            log_likelihood,
            empty_rows,
        };
        log::info!(
            "EM iteration {}: {} sentence pairs, log-likelihood {:.4}, {} empty rows",
            stats.iteration,
            stats.sentence_pairs,
            stats.log_likelihood,
            stats.empty_rows
        );
        Ok(stats)
    }

    /// Initialize once, then run exactly `num_iters` EM iterations.
    pub fn learn_ibm_parameters(
        &mut self,
        src_path: impl AsRef<Path>,
        dst_path: impl AsRef<Path>,
        num_iters: usize,
    ) -> Result<Vec<IterationStats>> {
        let (src_path, dst_path) = (src_path.as_ref(), dst_path.as_ref());
        self.initialize_translation_probs(src_path, dst_path)?;

        let mut history = Vec::with_capacity(num_iters);
        for _ in 0..num_iters {
            history.push(self.em_step(src_path, dst_path)?);
        }

        self.state = TrainingState::Done {
            iterations: num_iters,
        };
        Ok(history)
    }

    /// [`learn_ibm_parameters`](IbmModel1::learn_ibm_parameters) with the
    /// configured iteration count.
    pub fn train(
        &mut self,
        src_path: impl AsRef<Path>,
        dst_path: impl AsRef<Path>,
    ) -> Result<Vec<IterationStats>> {
        let iterations = self.config.iterations;
        self.learn_ibm_parameters(src_path, dst_path, iterations)
    }

    fn ensure_initialized(&self) -> Result<()> {
        match self.state {
            TrainingState::Uninitialized => Err(MorphonError::NotInitialized),
            _ => Ok(()),
        }
    }

    fn target_key(&self, target: Target<'_>) -> Option<TargetKey> {
        match target {
            Target::Null => Some(TargetKey::Null),
            Target::Word(token) => self.targets.get_id(token).map(TargetKey::Word),
        }
    }

    fn resolve_target(&self, key: TargetKey) -> Target<'_> {
        match key {
            TargetKey::Null => Target::Null,
            TargetKey::Word(id) => Target::Word(self.targets.get_symbol(id).unwrap_or_default()),
        }
    }

    /// `P(source | target)`; 0 for unknown tokens and unobserved pairs.
    pub fn probability(&self, target: Target<'_>, source: &str) -> f64 {
        match (self.target_key(target), self.sources.get_id(source)) {
            (Some(t), Some(s)) => self.table.prob(t, s),
            _ => 0.0,
        }
    }

    /// The row of `target` as `(source, probability)` in discovery order.
    pub fn translations(&self, target: Target<'_>) -> Vec<(&str, f64)> {
        self.target_key(target)
            .and_then(|key| self.table.row(key))
            .map(|row| {
                row.entries()
                    .map(|(s, p)| (self.sources.get_symbol(s).unwrap_or_default(), p))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The `k` most probable sources for `target`, highest first.
    ///
    /// Equal probabilities keep discovery order.
    pub fn top_translations(&self, target: Target<'_>, k: usize) -> Vec<(&str, f64)> {
        let mut row = self.translations(target);
        row.sort_by(|a, b| b.1.total_cmp(&a.1));
        row.truncate(k);
        row
    }

    /// Every table entry as `(target, source, probability)`.
    pub fn entries(&self) -> impl Iterator<Item = (Target<'_>, &str, f64)> + '_ {
        self.table.rows().iter().flat_map(move |row| {
            let target = self.resolve_target(row.target());
            row.entries()
                .map(move |(s, p)| (target, self.sources.get_symbol(s).unwrap_or_default(), p))
        })
    }

    /// Accumulated count for `(target, source)` in `counts`.
    pub fn expected_count(&self, counts: &ExpectedCounts, target: Target<'_>, source: &str) -> f64 {
        let Some(key) = self.target_key(target) else {
            return 0.0;
        };
        let Some(source) = self.sources.get_id(source) else {
            return 0.0;
        };
        match self.table.row_index(key) {
            Some(idx) => self.table.rows()[idx]
                .slot(source)
                .map_or(0.0, |slot| counts.get(idx, slot)),
            None => 0.0,
        }
    }

    /// Most probable target for each source token.
    ///
    /// Returns, per source position, the index of the chosen word in
    /// `target_sentence`, or `None` when the null target wins or nothing has
    /// probability mass. Ties go to the earliest target word.
    pub fn best_alignment<T: AsRef<str>, S: AsRef<str>>(
        &self,
        target_sentence: &[T],
        source_sentence: &[S],
    ) -> Vec<Option<usize>> {
        source_sentence
            .iter()
            .map(|source| {
                let source = source.as_ref();
                let mut best: Option<(usize, f64)> = None;
                for (pos, target) in target_sentence.iter().enumerate() {
                    let p = self.probability(Target::Word(target.as_ref()), source);
                    if p > best.map_or(0.0, |(_, bp)| bp) {
                        best = Some((pos, p));
                    }
                }

                let null_p = self.probability(Target::Null, source);
                match best {
                    Some((pos, p)) if p >= null_p => Some(pos),
                    _ => None,
                }
            })
            .collect()
    }
}

impl Default for IbmModel1 {
    fn default() -> Self {
        Self::new(Ibm1Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const CORPUS: [&str; 4] = [
        "123 124 234 345",
        "112 122 123 345",
        "123456789",
        "123456 456789",
    ];

    fn write_corpus(dir: &TempDir, name: &str, lines: &[&str]) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "{}", lines.join("\n")).unwrap();
        path
    }

    fn two_tmp_files() -> (TempDir, PathBuf, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let src = write_corpus(&dir, "test1.txt", &CORPUS);
        let dst = write_corpus(&dir, "test2.txt", &CORPUS);
        (dir, src, dst)
    }

    fn assert_rows_normalized(model: &IbmModel1) {
        for row in model.table().rows() {
            assert!((row.total() - 1.0).abs() < 1e-9, "row {:?}", row.target());
        }
    }

    #[test]
    fn test_init() {
        let (_dir, src, dst) = two_tmp_files();
        let mut model = IbmModel1::default();
        model.initialize_translation_probs(&src, &dst).unwrap();

        assert_eq!(model.state(), TrainingState::Initialized);
        assert_eq!(model.table().len(), 10);
        assert_eq!(model.translations(Target::Null).len(), 9);
        assert_eq!(model.translations(Target::word("345")).len(), 6);
        assert_eq!(model.probability(Target::word("122"), "123"), 0.25);
        assert_rows_normalized(&model);
    }

    #[test]
    fn test_init_line_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let src = write_corpus(&dir, "src.txt", &CORPUS);
        let dst = write_corpus(&dir, "dst.txt", &CORPUS[..3]);

        let mut model = IbmModel1::default();
        let err = model.initialize_translation_probs(&src, &dst).unwrap_err();

        assert!(matches!(
            err,
            MorphonError::CorpusMismatch {
                source_lines: 4,
                target_lines: 3
            }
        ));
        assert_eq!(model.state(), TrainingState::Uninitialized);
        assert!(model.table().is_empty());
    }

    #[test]
    fn test_init_missing_file() {
        let (dir, src, _dst) = two_tmp_files();
        let mut model = IbmModel1::default();

        let err = model
            .initialize_translation_probs(&src, dir.path().join("missing.txt"))
            .unwrap_err();
        assert!(matches!(err, MorphonError::Io { .. }));
    }

    #[test]
    fn test_failed_reinit_keeps_trained_table() {
        let (dir, src, dst) = two_tmp_files();
        let short = write_corpus(&dir, "short.txt", &CORPUS[..2]);
        let mut model = IbmModel1::default();
        model.learn_ibm_parameters(&src, &dst, 2).unwrap();

        let snapshot = |model: &IbmModel1| -> Vec<(String, String, u64)> {
            model
                .entries()
                .map(|(t, s, p)| (format!("{:?}", t), s.to_string(), p.to_bits()))
                .collect()
        };
        let before = snapshot(&model);

        let err = model.initialize_translation_probs(&src, &short).unwrap_err();
        assert!(matches!(err, MorphonError::CorpusMismatch { .. }));

        let after = snapshot(&model);
        assert_eq!(after, before);
        assert_eq!(model.state(), TrainingState::Done { iterations: 2 });
        assert_eq!(model.table().len(), 10);
    }

    #[test]
    fn test_e_step_rejects_counts_from_previous_table() {
        let small = ParallelCorpus::from_lines(&["a"], &["x"]).unwrap();
        let large = ParallelCorpus::from_lines(&["a b c"], &["x y z"]).unwrap();
        let mut model = IbmModel1::default();

        model.initialize_from_corpus(&small);
        let mut stale = model.table().zeroed_counts();
        model.initialize_from_corpus(&large);

        let pair = model.encode_pair(&large.pairs()[0]);
        let err = model
            .e_step(&pair.targets, &pair.sources, &mut stale)
            .unwrap_err();
        assert!(matches!(err, MorphonError::CountsMismatch { .. }));
        assert_eq!(stale.total(), 0.0);

        let mut counts = model.table().zeroed_counts();
        model.e_step(&pair.targets, &pair.sources, &mut counts).unwrap();
        assert!((counts.total() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_e_step() {
        let (_dir, src, dst) = two_tmp_files();
        let mut model = IbmModel1::default();
        model.initialize_translation_probs(&src, &dst).unwrap();

        let tokens = ["123", "124", "234", "345"];
        let pair = model.pair_from_tokens(&tokens, &tokens);
        assert_eq!(pair.targets.len(), 5);
        assert_eq!(pair.targets.last(), Some(&TargetKey::Null));

        let mut counts = model.table().zeroed_counts();
        model.e_step(&pair.targets, &pair.sources, &mut counts).unwrap();

        let count = model.expected_count(&counts, Target::word("123"), "345");
        assert!((count - 0.25).abs() < 1e-12);
        // Every target distributes exactly one unit of mass.
        assert!((counts.total() - 5.0).abs() < 1e-12);
        // The table is untouched by the expectation pass.
        assert_eq!(model.probability(Target::word("123"), "345"), 1.0 / 6.0);
    }

    #[test]
    fn test_e_step_per_source() {
        let corpus =
            ParallelCorpus::from_lines(&["das haus", "das buch"], &["the house", "the book"])
                .unwrap();
        let mut model = IbmModel1::new(Ibm1Config {
            normalization: Normalization::PerSource,
            ..Default::default()
        });
        model.initialize_from_corpus(&corpus);

        let pair = model.encode_pair(&corpus.pairs()[0]);
        let mut counts = model.table().zeroed_counts();
        model.e_step(&pair.targets, &pair.sources, &mut counts).unwrap();

        // Each source distributes one unit over the, house and null.
        assert!((counts.total() - 2.0).abs() < 1e-12);
        // p(das|the) = 1/3, p(das|house) = 1/2, p(das|null) = 1/3
        let expected = (1.0 / 3.0) / (1.0 / 3.0 + 1.0 / 2.0 + 1.0 / 3.0);
        let got = model.expected_count(&counts, Target::word("the"), "das");
        assert!((got - expected).abs() < 1e-12);
    }

    #[test]
    fn test_em_step() {
        let (_dir, src, dst) = two_tmp_files();
        let mut model = IbmModel1::default();
        model.initialize_translation_probs(&src, &dst).unwrap();

        let stats = model.em_step(&src, &dst).unwrap();

        assert_eq!(stats.iteration, 1);
        assert_eq!(stats.sentence_pairs, 4);
        assert!(stats.log_likelihood < 0.0);
        assert_eq!(model.state(), TrainingState::Converging { iterations: 1 });
        assert_eq!(model.probability(Target::word("456789"), "345"), 0.0);
        assert_eq!(model.probability(Target::word("456789"), "456789"), 0.5);
        assert!(
            model.probability(Target::Null, "124") < model.probability(Target::Null, "456789")
        );
        assert_rows_normalized(&model);
    }

    #[test]
    fn test_em_step_requires_initialization() {
        let (_dir, src, dst) = two_tmp_files();
        let mut model = IbmModel1::default();

        let err = model.em_step(&src, &dst).unwrap_err();
        assert!(matches!(err, MorphonError::NotInitialized));
    }

    #[test]
    fn test_ibm_train() {
        let (_dir, src, dst) = two_tmp_files();
        let mut model = IbmModel1::default();

        let history = model.learn_ibm_parameters(&src, &dst, 3).unwrap();

        assert_eq!(history.len(), 3);
        assert_eq!(model.state(), TrainingState::Done { iterations: 3 });
        assert_eq!(model.probability(Target::word("456789"), "345"), 0.0);
        assert_eq!(model.probability(Target::word("456789"), "456789"), 0.5);
        assert!(
            model.probability(Target::Null, "124") < model.probability(Target::Null, "456789")
        );
        assert_rows_normalized(&model);
    }

    #[test]
    fn test_training_is_deterministic() {
        let (_dir, src, dst) = two_tmp_files();
        let snapshot = |model: &IbmModel1| -> Vec<(String, String, u64)> {
            model
                .entries()
                .map(|(t, s, p)| {
                    let t = match t {
                        Target::Null => "<null>".to_string(),
                        Target::Word(w) => w.to_string(),
                    };
                    (t, s.to_string(), p.to_bits())
                })
                .collect()
        };

        let mut first = IbmModel1::default();
        first.learn_ibm_parameters(&src, &dst, 4).unwrap();
        let mut second = IbmModel1::default();
        second.learn_ibm_parameters(&src, &dst, 4).unwrap();

        assert_eq!(snapshot(&first), snapshot(&second));
    }

    #[test]
    fn test_repeated_pair_converges() {
        let corpus = ParallelCorpus::from_lines(&["haus"; 5], &["house"; 5]).unwrap();
        let mut model = IbmModel1::default();
        model.initialize_from_corpus(&corpus);

        for _ in 0..3 {
            model.em_step_corpus(&corpus).unwrap();
            assert!((model.probability(Target::word("house"), "haus") - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_shared_word_converges() {
        let corpus = ParallelCorpus::from_lines(
            &["das haus", "das buch", "ein buch"],
            &["the house", "the book", "a book"],
        )
        .unwrap();
        let mut model = IbmModel1::default();
        model.initialize_from_corpus(&corpus);

        let mut previous = model.probability(Target::word("the"), "das");
        for _ in 0..10 {
            model.em_step_corpus(&corpus).unwrap();
            let current = model.probability(Target::word("the"), "das");
            assert!(current > previous);
            previous = current;
        }
        assert!(previous > 0.99);

        let top = model.top_translations(Target::word("the"), 1);
        assert_eq!(top[0].0, "das");

        let alignment = model.best_alignment(&["the", "house"], &["das", "haus"]);
        assert_eq!(alignment[0], Some(0));
    }

    #[test]
    fn test_per_source_rows_stay_normalized() {
        let corpus = ParallelCorpus::from_lines(
            &["das haus", "das buch", "ein buch"],
            &["the house", "the book", "a book"],
        )
        .unwrap();
        let mut model = IbmModel1::new(Ibm1Config {
            iterations: 3,
            normalization: Normalization::PerSource,
        });
        model.initialize_from_corpus(&corpus);

        for _ in 0..model.config().iterations {
            model.em_step_corpus(&corpus).unwrap();
            assert_rows_normalized(&model);
        }
        assert!(
            model.probability(Target::word("the"), "das")
                > model.probability(Target::word("the"), "haus")
        );
    }

    #[test]
    fn test_target_without_sources() {
        let corpus = ParallelCorpus::from_lines(&["", "a"], &["lonely", "x"]).unwrap();
        let mut model = IbmModel1::default();
        model.initialize_from_corpus(&corpus);

        assert!(model.translations(Target::word("lonely")).is_empty());
        assert_eq!(model.probability(Target::word("lonely"), "a"), 0.0);

        let stats = model.em_step_corpus(&corpus).unwrap();
        assert_eq!(stats.empty_rows, 0);
        assert_eq!(model.probability(Target::word("x"), "a"), 1.0);
    }

    #[test]
    fn test_zero_mass_rows_become_zero() {
        let train = ParallelCorpus::from_lines(&["a", "b"], &["x", "y"]).unwrap();
        let mut model = IbmModel1::default();
        model.initialize_from_corpus(&train);

        // An EM pass over a corpus that never mentions "y".
        let other = ParallelCorpus::from_lines(&["a"], &["x"]).unwrap();
        let stats = model.em_step_corpus(&other).unwrap();

        assert_eq!(stats.empty_rows, 1);
        let row = model.translations(Target::word("y"));
        assert_eq!(row, vec![("b", 0.0)]);
    }

    #[test]
    fn test_empty_corpus() {
        let corpus = ParallelCorpus::from_lines::<&str, &str>(&[], &[]).unwrap();
        let mut model = IbmModel1::default();
        model.initialize_from_corpus(&corpus);

        assert!(model.table().is_empty());
        let stats = model.em_step_corpus(&corpus).unwrap();
        assert_eq!(stats.sentence_pairs, 0);
        assert_eq!(stats.log_likelihood, 0.0);
        assert_eq!(model.probability(Target::Null, "anything"), 0.0);
    }

    #[test]
    fn test_null_never_collides_with_tokens() {
        let corpus = ParallelCorpus::from_lines(&["a"], &["<null>"]).unwrap();
        let mut model = IbmModel1::default();
        model.initialize_from_corpus(&corpus);

        assert_eq!(model.table().len(), 2);
        assert_eq!(model.probability(Target::word("<null>"), "a"), 1.0);
        assert_eq!(model.probability(Target::Null, "a"), 1.0);
    }
}
