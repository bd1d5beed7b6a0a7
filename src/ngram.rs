//! N-gram frequency model built from a token stream.
//!
//! The model counts every window of `n` consecutive tokens together with every
//! window of `n - 1` tokens (the contexts) in a single pass over the stream.
//! Conditional probabilities are exact ratios of those counts:
//!
//! ```text
//! P(w | c) = count(c, w) / count(c)
//! ```
//!
//! # Vocabulary
//!
//! Tokens are interned into `u32` ids in first-seen order, so windows are
//! stored as small id slices instead of string tuples. The first-seen position
//! of each n-gram is kept as well; it is the tie-break when two n-grams of the
//! same context share a count in [`NGramModel::export`].
//!
//! # Usage
//!
//! ```rust
//! use ngram_spell::ngram::NGramModel;
//!
//! let stream: Vec<String> = ". the green shirt . the green grass ."
//!     .split(' ')
//!     .map(str::to_string)
//!     .collect();
//! let model = NGramModel::new(&stream, 3, 5000).unwrap();
//! assert_eq!(model.frequency(&["the", "green", "shirt"]).unwrap(), 1);
//! ```

use ahash::{AHashMap, AHashSet};
use log::{debug, info};

use crate::error::{Error, Result};
use crate::store::{ContextEntry, ContextMap};

/// Base symbol of the sentinel word.
const SENTINEL_BASE: &str = "??";
/// Character appended to the sentinel until it is unique.
const SENTINEL_MARKER: char = '?';

/// Options that change how the stream is counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Replace every token outside the `max_vocabulary_size` most common ones
    /// with the sentinel word before counting windows.
    pub fold_rare_words: bool,
}

/// Exact conditional probability `numerator / denominator`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probability {
    pub numerator: u64,
    pub denominator: u64,
}

impl Probability {
    pub fn as_f64(&self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }
}

/// Count of an n-gram and the stream position where it first appeared.
#[derive(Debug, Clone, Copy)]
struct GramStat {
    count: u64,
    first_seen: usize,
}

/// Interned tokens with their occurrence counts.
#[derive(Debug, Default)]
struct Vocabulary {
    ids: AHashMap<String, u32>,
    words: Vec<String>,
    counts: Vec<u64>,
}

impl Vocabulary {
    fn intern(&mut self, word: &str) -> u32 {
        if let Some(&id) = self.ids.get(word) {
            self.counts[id as usize] += 1;
            return id;
        }
        let id = self.words.len() as u32;
        self.ids.insert(word.to_string(), id);
        self.words.push(word.to_string());
        self.counts.push(1);
        id
    }

    fn id(&self, word: &str) -> Option<u32> {
        self.ids.get(word).copied()
    }

    fn word(&self, id: u32) -> &str {
        &self.words[id as usize]
    }

    fn contains(&self, word: &str) -> bool {
        self.ids.contains_key(word)
    }

    /// Ids ordered by descending count; first-seen order breaks ties.
    fn most_common(&self, limit: usize) -> Vec<u32> {
        let mut ids: Vec<u32> = (0..self.words.len() as u32).collect();
        ids.sort_by(|&a, &b| {
            self.counts[b as usize]
                .cmp(&self.counts[a as usize])
                .then(a.cmp(&b))
        });
        ids.truncate(limit);
        ids
    }
}

/// Returns the first of `??`, `???`, `????`, ... for which `is_known` is false.
///
/// # Example
/// ```rust
/// use ngram_spell::ngram::sentinel_word;
///
/// let taken = ["??", "???"];
/// assert_eq!(sentinel_word(|w| taken.contains(&w)), "????");
/// ```
pub fn sentinel_word<F>(is_known: F) -> String
where
    F: Fn(&str) -> bool,
{
    let mut word = SENTINEL_BASE.to_string();
    while is_known(&word) {
        word.push(SENTINEL_MARKER);
    }
    word
}

/// An n-gram language model over a token stream.
///
/// # Invariants
/// - `n >= 1` and `max_vocabulary_size >= 1`
/// - every key of `gram_counts` has length `n`, every key of
///   `context_counts` has length `n - 1`
#[derive(Debug)]
pub struct NGramModel {
    n: usize,
    vocabulary: Vocabulary,
    stream_len: usize,
    /// Windows of length n → count and first position.
    gram_counts: AHashMap<Box<[u32]>, GramStat>,
    /// Windows of length n - 1 → count. Unused when n == 1.
    context_counts: AHashMap<Box<[u32]>, u64>,
    common_words: Vec<String>,
    special_word: String,
}

impl NGramModel {
    /// Build a model of order `n` over `stream` with default options.
    ///
    /// # Errors
    /// Returns [`Error::Configuration`] if `n < 1` or `max_vocabulary_size < 1`.
    pub fn new<S: AsRef<str>>(stream: &[S], n: usize, max_vocabulary_size: usize) -> Result<Self> {
        Self::with_options(stream, n, max_vocabulary_size, BuildOptions::default())
    }

    /// Build a model of order `n` over `stream`.
    ///
    /// # Errors
    /// Returns [`Error::Configuration`] if `n < 1` or `max_vocabulary_size < 1`.
    pub fn with_options<S: AsRef<str>>(
        stream: &[S],
        n: usize,
        max_vocabulary_size: usize,
        options: BuildOptions,
    ) -> Result<Self> {
        if n < 1 {
            return Err(Error::configuration(format!("n must be >= 1, got {n}")));
        }
        if max_vocabulary_size < 1 {
            return Err(Error::configuration(format!(
                "max vocabulary size must be >= 1, got {max_vocabulary_size}"
            )));
        }

        let mut vocabulary = Vocabulary::default();
        let mut ids: Vec<u32> = stream.iter().map(|t| vocabulary.intern(t.as_ref())).collect();

        let special_word = sentinel_word(|w| vocabulary.contains(w));
        let common_ids = vocabulary.most_common(max_vocabulary_size);
        let common_words: Vec<String> = common_ids
            .iter()
            .map(|&id| vocabulary.word(id).to_string())
            .collect();

        if options.fold_rare_words {
            let common: AHashSet<u32> = common_ids.iter().copied().collect();
            let folded = ids.iter().filter(|id| !common.contains(id)).count();
            if folded > 0 {
                // Intern outside `Vocabulary::intern` so the sentinel's count
                // reflects how many tokens were folded into it
                let sentinel = vocabulary.words.len() as u32;
                vocabulary.ids.insert(special_word.clone(), sentinel);
                vocabulary.words.push(special_word.clone());
                vocabulary.counts.push(folded as u64);
                for id in ids.iter_mut() {
                    if !common.contains(id) {
                        *id = sentinel;
                    }
                }
            }
            debug!("Folded {} rare tokens into {:?}", folded, special_word);
        }

        let gram_counts = count_grams(&ids, n);
        let context_counts = if n > 1 {
            count_windows(&ids, n - 1)
        } else {
            AHashMap::new()
        };

        info!(
            "Built {}-gram model: {} tokens, {} distinct words, {} distinct grams",
            n,
            ids.len(),
            vocabulary.words.len(),
            gram_counts.len()
        );

        Ok(Self {
            n,
            vocabulary,
            stream_len: ids.len(),
            gram_counts,
            context_counts,
            common_words,
            special_word,
        })
    }

    /// The order `n` of the model.
    pub fn order(&self) -> usize {
        self.n
    }

    /// The `max_vocabulary_size` most frequent tokens of the stream.
    pub fn common_words(&self) -> &[String] {
        &self.common_words
    }

    /// A token guaranteed not to occur in the training stream.
    pub fn special_word(&self) -> &str {
        &self.special_word
    }

    /// How many times `gram` occurred in the stream.
    ///
    /// # Errors
    /// Returns [`Error::LengthMismatch`] if `gram` does not have exactly `n` tokens.
    pub fn frequency<S: AsRef<str>>(&self, gram: &[S]) -> Result<u64> {
        self.check_len(gram)?;
        Ok(self
            .lookup_ids(gram)
            .and_then(|ids| self.gram_counts.get(ids.as_slice()))
            .map_or(0, |stat| stat.count))
    }

    /// How many times the `n - 1` tokens of `context` occurred in a row.
    ///
    /// The empty context (unigram models) occurs once per token.
    ///
    /// # Errors
    /// Returns [`Error::LengthMismatch`] if `context` does not have `n - 1` tokens.
    pub fn context_frequency<S: AsRef<str>>(&self, context: &[S]) -> Result<u64> {
        if context.len() != self.n - 1 {
            return Err(Error::LengthMismatch {
                expected: self.n - 1,
                actual: context.len(),
            });
        }
        if context.is_empty() {
            return Ok(self.stream_len as u64);
        }
        Ok(self
            .lookup_ids(context)
            .and_then(|ids| self.context_counts.get(ids.as_slice()))
            .copied()
            .unwrap_or(0))
    }

    /// `P(last token | preceding n - 1 tokens)` as an exact ratio.
    ///
    /// # Errors
    /// - [`Error::LengthMismatch`] if `gram` does not have exactly `n` tokens
    /// - [`Error::UndefinedProbability`] if the context never occurred
    pub fn probability<S: AsRef<str>>(&self, gram: &[S]) -> Result<Probability> {
        let numerator = self.frequency(gram)?;
        let context = &gram[..self.n - 1];
        let denominator = self.context_frequency(context)?;

        if denominator == 0 {
            return Err(Error::UndefinedProbability {
                context: context.iter().map(|w| w.as_ref().to_string()).collect(),
            });
        }

        Ok(Probability {
            numerator,
            denominator,
        })
    }

    /// Group every observed n-gram by its context.
    ///
    /// Within a context, entries are ordered by descending count; n-grams with
    /// equal counts keep the order in which they first appeared in the stream.
    pub fn export(&self) -> ContextMap {
        let mut grams: Vec<(&[u32], GramStat)> = self
            .gram_counts
            .iter()
            .map(|(ids, stat)| (&**ids, *stat))
            .collect();
        grams.sort_by(|a, b| {
            b.1.count
                .cmp(&a.1.count)
                .then(a.1.first_seen.cmp(&b.1.first_seen))
        });

        let mut map = ContextMap::new(self.n);
        for (ids, stat) in grams {
            let (context, last) = ids.split_at(self.n - 1);
            let context: Vec<String> = context
                .iter()
                .map(|&id| self.vocabulary.word(id).to_string())
                .collect();
            map.push(
                context,
                ContextEntry {
                    word: self.vocabulary.word(last[0]).to_string(),
                    count: stat.count,
                },
            );
        }

        debug!("Exported {} contexts for n = {}", map.len(), self.n);
        map
    }

    fn check_len<S>(&self, gram: &[S]) -> Result<()> {
        if gram.len() != self.n {
            return Err(Error::LengthMismatch {
                expected: self.n,
                actual: gram.len(),
            });
        }
        Ok(())
    }

    /// Map words to ids; `None` if any word was never seen.
    fn lookup_ids<S: AsRef<str>>(&self, words: &[S]) -> Option<Vec<u32>> {
        words.iter().map(|w| self.vocabulary.id(w.as_ref())).collect()
    }
}

fn count_grams(ids: &[u32], n: usize) -> AHashMap<Box<[u32]>, GramStat> {
    let mut counts: AHashMap<Box<[u32]>, GramStat> = AHashMap::new();
    if ids.len() < n {
        return counts;
    }
    for (position, window) in ids.windows(n).enumerate() {
        if let Some(stat) = counts.get_mut(window) {
            stat.count += 1;
        } else {
            counts.insert(
                window.into(),
                GramStat {
                    count: 1,
                    first_seen: position,
                },
            );
        }
    }
    counts
}

fn count_windows(ids: &[u32], size: usize) -> AHashMap<Box<[u32]>, u64> {
    let mut counts: AHashMap<Box<[u32]>, u64> = AHashMap::new();
    if ids.len() < size {
        return counts;
    }
    for window in ids.windows(size) {
        if let Some(count) = counts.get_mut(window) {
            *count += 1;
        } else {
            counts.insert(window.into(), 1);
        }
    }
    counts
}
