//! Misspelling detection and context-ranked suggestions.
//!
//! For every token that fails the dictionary test, candidates are drawn from
//! two context depths: the words that followed the previous two tokens in
//! the training corpus (trigram store) and the words that followed the
//! previous token (bigram store). Each source is scored by edit distance and
//! the two ranked lists are merged bucket by bucket, trigram first.
//!
//! # Forward correction
//!
//! Checking works on a sequence of lemmas. Once a misspelled position has
//! been ranked, its top candidate replaces it in that sequence, so later
//! positions see the corrected word as context:
//!
//! ```text
//! .  the  grean  shrt       grean -> green
//! .  the  green  shrt       ("the", "green") now finds "shirt"
//! ```
//!
//! A wrong top candidate is propagated the same way.

use log::debug;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::sync::Arc;

use crate::config::Config;
use crate::corpus::BOUNDARY_TOKEN;
use crate::error::{Error, Result};
use crate::linguistics::{LanguageServices, PartOfSpeech};
use crate::store::{ContextEntry, ContextMap, NGramStore};

/// Tunable constants of the ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrectorSettings {
    /// Order of the deeper context model; the shallow one is always bigrams.
    pub number_of_grams: usize,
    /// Candidates farther than this from the misspelled token are dropped.
    pub max_distance: usize,
    /// Length cap of each suggestion list.
    pub max_suggestions: usize,
}

impl Default for CorrectorSettings {
    fn default() -> Self {
        Self {
            number_of_grams: 3,
            max_distance: 4,
            max_suggestions: 5,
        }
    }
}

impl From<&Config> for CorrectorSettings {
    fn from(config: &Config) -> Self {
        Self {
            max_distance: config.max_distance,
            max_suggestions: config.max_suggestions,
            ..Self::default()
        }
    }
}

/// A scored candidate word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub word: String,
    pub distance: usize,
}

impl Candidate {
    pub fn new<S: Into<String>>(word: S, distance: usize) -> Self {
        Self {
            word: word.into(),
            distance,
        }
    }
}

/// One flagged token and its ranked replacements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrectionResult {
    /// Token index in the checked text; punctuation counts, the first token is 0.
    pub position: usize,
    /// The token as it was checked.
    pub original: String,
    /// Most likely replacement first, at most `max_suggestions` long. May be
    /// empty when no stored context offers a close enough word.
    pub candidates: Vec<String>,
}

/// Score `entries` against `word`.
///
/// Each entry is compared as written (lower-cased). When that form lies
/// within `max_distance` it is kept with its own distance; otherwise its lemma
/// under `pos` is tried instead. Entries starting with punctuation are skipped.
/// The result is sorted by ascending distance, keeping entry order on ties.
pub fn find_nearest_words<L: LanguageServices>(
    entries: &[ContextEntry],
    word: &str,
    pos: PartOfSpeech,
    services: &L,
    max_distance: usize,
) -> Vec<Candidate> {
    let mut nearest = Vec::new();

    for entry in entries {
        let starts_with_punctuation = entry
            .word
            .chars()
            .next()
            .is_some_and(|c| services.is_punctuation(c.encode_utf8(&mut [0; 4])));
        if starts_with_punctuation {
            continue;
        }

        let candidate = entry.word.to_lowercase();
        let word_distance = services.edit_distance(word, &candidate);
        if word_distance <= max_distance {
            nearest.push(Candidate::new(candidate, word_distance));
            continue;
        }

        let lemma = services.lemmatize(&candidate, pos);
        let lemma_distance = services.edit_distance(word, &lemma);
        if lemma_distance <= max_distance {
            nearest.push(Candidate::new(lemma, lemma_distance));
        }
    }

    nearest.sort_by_key(|c| c.distance);
    nearest
}

/// Merge trigram- and bigram-sourced candidates into one ranked word list.
///
/// Distances `1..=max_distance` are visited in order. Within a distance, every
/// trigram candidate is appended, then every bigram candidate that was not
/// already in the list before this bigram pass. Trigram candidates are never
/// deduplicated, and distance 0 falls outside every bucket.
pub fn merge_candidates(
    trigram: &[Candidate],
    bigram: &[Candidate],
    max_distance: usize,
) -> Vec<String> {
    let mut merged: Vec<String> = Vec::new();

    for distance in 1..=max_distance {
        merged.extend(
            trigram
                .iter()
                .filter(|c| c.distance == distance)
                .map(|c| c.word.clone()),
        );

        let from_bigram: Vec<String> = bigram
            .iter()
            .filter(|c| c.distance == distance && !merged.contains(&c.word))
            .map(|c| c.word.clone())
            .collect();
        merged.extend(from_bigram);
    }

    merged
}

/// Ranked suggestions for the token at `index` of `sequence`.
///
/// The trigram context is the `number_of_grams - 1` tokens before `index`;
/// when fewer precede it, the trigram source contributes nothing. The bigram
/// context is the single previous token. Contexts missing from a store are
/// not errors; they just contribute no candidates.
pub fn suggest_at<L: LanguageServices>(
    sequence: &[String],
    index: usize,
    pos: PartOfSpeech,
    trigrams: &ContextMap,
    bigrams: &ContextMap,
    services: &L,
    settings: &CorrectorSettings,
) -> Vec<String> {
    let word = &sequence[index];
    let width = settings.number_of_grams - 1;

    let trigram_candidates = if index >= width {
        let context = &sequence[index - width..index];
        find_nearest_words(
            trigrams.candidates(context),
            word,
            pos,
            services,
            settings.max_distance,
        )
    } else {
        Vec::new()
    };

    let bigram_candidates = if index >= 1 {
        let context = &sequence[index - 1..index];
        find_nearest_words(
            bigrams.candidates(context),
            word,
            pos,
            services,
            settings.max_distance,
        )
    } else {
        Vec::new()
    };

    let mut merged =
        merge_candidates(&trigram_candidates, &bigram_candidates, settings.max_distance);
    merged.truncate(settings.max_suggestions);
    merged
}

/// Spelling corrector over a pair of loaded context maps.
///
/// The maps are shared read-only; a corrector holds no state between
/// [`check`](Self::check) calls.
pub struct Corrector<L> {
    trigrams: Arc<ContextMap>,
    bigrams: Arc<ContextMap>,
    services: L,
    settings: CorrectorSettings,
}

impl<L: LanguageServices> Corrector<L> {
    /// Create a corrector over already loaded maps.
    ///
    /// # Errors
    /// Returns [`Error::Configuration`] if the settings are unusable or a map
    /// has the wrong order.
    pub fn new(
        trigrams: Arc<ContextMap>,
        bigrams: Arc<ContextMap>,
        services: L,
        settings: CorrectorSettings,
    ) -> Result<Self> {
        if settings.number_of_grams < 2 {
            return Err(Error::configuration("number of grams must be >= 2"));
        }
        if settings.max_suggestions < 1 {
            return Err(Error::configuration("max suggestions must be >= 1"));
        }
        if trigrams.order() != settings.number_of_grams {
            return Err(Error::configuration(format!(
                "context store has order {}, expected {}",
                trigrams.order(),
                settings.number_of_grams
            )));
        }
        if bigrams.order() != 2 {
            return Err(Error::configuration(format!(
                "bigram store has order {}, expected 2",
                bigrams.order()
            )));
        }

        Ok(Self {
            trigrams,
            bigrams,
            services,
            settings,
        })
    }

    /// Load both maps from `store`.
    ///
    /// # Errors
    /// Returns [`Error::StoreNotFound`] if either store has not been built.
    pub fn from_store(
        store: &NGramStore,
        services: L,
        settings: CorrectorSettings,
    ) -> Result<Self> {
        let trigrams = store.load(settings.number_of_grams)?;
        let bigrams = store.load(2)?;
        Self::new(Arc::new(trigrams), Arc::new(bigrams), services, settings)
    }

    /// A token is misspelled unless it is a dictionary word, punctuation, or
    /// its stem plus a trailing "e" is a dictionary word.
    pub fn has_spelling_error(&self, word: &str) -> bool {
        if self.services.is_word(word) || self.services.is_punctuation(word) {
            return false;
        }
        let silent_e = format!("{}e", self.services.stem(word));
        !self.services.is_word(&silent_e)
    }

    /// Flag misspelled tokens in `text` and rank replacements for each.
    ///
    /// Returns an empty list when nothing is misspelled.
    pub fn check(&self, text: &str) -> Vec<CorrectionResult> {
        let mut tokens = vec![BOUNDARY_TOKEN.to_string()];
        tokens.extend(self.services.tokenize(&text.to_lowercase()));
        let tags = self.services.tag(&tokens);

        let poses: Vec<PartOfSpeech> = tags.iter().map(|t| PartOfSpeech::from_tag(t)).collect();
        let mut working: Vec<String> = tokens
            .iter()
            .zip(&poses)
            .map(|(token, &pos)| self.services.lemmatize(token, pos))
            .collect();

        let mut results = Vec::new();
        // Position 0 is the boundary token
        for index in 1..working.len() {
            if !self.has_spelling_error(&working[index]) {
                continue;
            }

            let original = working[index].clone();
            let candidates = suggest_at(
                &working,
                index,
                poses[index],
                &self.trigrams,
                &self.bigrams,
                &self.services,
                &self.settings,
            );
            debug!("Misspelled {:?} at {}: {:?}", original, index, candidates);

            if let Some(top) = candidates.first() {
                working[index] = top.clone();
            }

            results.push(CorrectionResult {
                position: index - 1,
                original,
                candidates,
            });
        }

        results
    }

    /// Check many texts on a pool of `workers` threads.
    ///
    /// Results come back in input order and equal what [`check`](Self::check)
    /// returns for each text.
    ///
    /// # Errors
    /// Returns [`Error::WorkerPool`] if the thread pool cannot be started.
    pub fn check_batch<T>(&self, texts: &[T], workers: usize) -> Result<Vec<Vec<CorrectionResult>>>
    where
        T: AsRef<str> + Sync,
        L: Sync,
    {
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers.max(1))
            .thread_name(|i| format!("check-{i}"))
            .build()?;

        Ok(pool.install(|| texts.par_iter().map(|text| self.check(text.as_ref())).collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::Dictionary;
    use crate::linguistics::BasicServices;
    use crate::ngram::NGramModel;

    fn words(text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }

    fn services() -> BasicServices {
        BasicServices::new(Dictionary::from_words([
            "the", "green", "shirt", "grass", "shoe", "red", "i", "was", "be", "able", "to",
            "sleep", "tonight", "make", "run",
        ]))
    }

    fn maps(corpus: &str) -> (Arc<ContextMap>, Arc<ContextMap>) {
        let stream = words(corpus);
        let trigrams = NGramModel::new(&stream, 3, 5000).unwrap().export();
        let bigrams = NGramModel::new(&stream, 2, 5000).unwrap().export();
        (Arc::new(trigrams), Arc::new(bigrams))
    }

    fn corrector(corpus: &str) -> Corrector<BasicServices> {
        let (trigrams, bigrams) = maps(corpus);
        Corrector::new(trigrams, bigrams, services(), CorrectorSettings::default()).unwrap()
    }

    const SHIRTS: &str = ". the green shirt . the green grass . the green shoe . the red shoe .";

    #[test]
    fn test_merge_example() {
        let trigram = [Candidate::new("shirt", 1), Candidate::new("grass", 3)];
        let bigram = [Candidate::new("shirt", 1), Candidate::new("shoe", 2)];
        assert_eq!(merge_candidates(&trigram, &bigram, 4), vec!["shirt", "shoe", "grass"]);
    }

    #[test]
    fn test_merge_keeps_trigram_duplicates() {
        // A bigram word placed first is not removed when the trigram pass
        // brings it again at a larger distance
        let trigram = [Candidate::new("shoe", 3)];
        let bigram = [Candidate::new("shoe", 2)];
        assert_eq!(merge_candidates(&trigram, &bigram, 4), vec!["shoe", "shoe"]);
    }

    #[test]
    fn test_merge_drops_out_of_range_distances() {
        let trigram = [Candidate::new("same", 0), Candidate::new("far", 5)];
        let bigram = [Candidate::new("near", 4)];
        assert_eq!(merge_candidates(&trigram, &bigram, 4), vec!["near"]);
    }

    #[test]
    fn test_has_spelling_error() {
        let corrector = corrector(SHIRTS);
        assert!(!corrector.has_spelling_error("green"));
        assert!(!corrector.has_spelling_error("Green"));
        assert!(!corrector.has_spelling_error("."));
        assert!(!corrector.has_spelling_error(","));
        // stem "mak" + "e"
        assert!(!corrector.has_spelling_error("making"));
        assert!(corrector.has_spelling_error("btar"));
    }

    #[test]
    fn test_find_nearest_words_filters_and_sorts() {
        let entries = [
            ContextEntry { word: "Grass".to_string(), count: 5 },
            ContextEntry { word: ".".to_string(), count: 4 },
            ContextEntry { word: "shirt".to_string(), count: 2 },
            ContextEntry { word: "elephant".to_string(), count: 1 },
        ];
        let nearest = find_nearest_words(&entries, "shrt", PartOfSpeech::Noun, &services(), 4);
        // "grass" and "elephant" are both 5 edits away, "." is punctuation
        assert_eq!(nearest, vec![Candidate::new("shirt", 1)]);

        let nearest = find_nearest_words(&entries, "gras", PartOfSpeech::Noun, &services(), 4);
        assert_eq!(nearest, vec![Candidate::new("grass", 1)]);
    }

    #[test]
    fn test_find_nearest_words_keeps_written_form_in_range() {
        let services = BasicServices::new(Dictionary::from_words(["apple", "apples"]));
        let entries = [ContextEntry { word: "apples".to_string(), count: 1 }];
        // "apples" is 2 away; its closer lemma "apple" is not used
        let nearest = find_nearest_words(&entries, "aple", PartOfSpeech::Noun, &services, 4);
        assert_eq!(nearest, vec![Candidate::new("apples", 2)]);
    }

    #[test]
    fn test_find_nearest_words_falls_back_to_lemma() {
        let services = BasicServices::new(Dictionary::from_words(["apple", "apples"]));
        let entries = [ContextEntry { word: "apples".to_string(), count: 1 }];
        // "apples" is 2 away from "aple", out of range; "apple" is 1 away
        let nearest = find_nearest_words(&entries, "aple", PartOfSpeech::Noun, &services, 1);
        assert_eq!(nearest, vec![Candidate::new("apple", 1)]);
    }

    #[test]
    fn test_suggest_at_missing_contexts() {
        let (trigrams, bigrams) = maps(SHIRTS);
        let sequence = words(". zzz qqq grean");
        let suggestions = suggest_at(
            &sequence,
            3,
            PartOfSpeech::Adj,
            &trigrams,
            &bigrams,
            &services(),
            &CorrectorSettings::default(),
        );
        assert!(suggestions.is_empty());
    }

    #[test]
    fn test_suggest_at_first_position_uses_bigram_only() {
        let (trigrams, bigrams) = maps(SHIRTS);
        let sequence = words(". tha");
        let suggestions = suggest_at(
            &sequence,
            1,
            PartOfSpeech::Noun,
            &trigrams,
            &bigrams,
            &services(),
            &CorrectorSettings::default(),
        );
        assert_eq!(suggestions, vec!["the"]);
    }

    #[test]
    fn test_check_flags_and_ranks() {
        let corrector = corrector(SHIRTS);
        let results = corrector.check("The green shrt");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].position, 2);
        assert_eq!(results[0].original, "shrt");
        assert_eq!(results[0].candidates[0], "shirt");
        assert!(results[0].candidates.contains(&"shoe".to_string()));
    }

    #[test]
    fn test_check_clean_text() {
        let corrector = corrector(SHIRTS);
        assert!(corrector.check("The green grass.").is_empty());
        assert!(corrector.check("").is_empty());
    }

    #[test]
    fn test_check_caps_suggestions() {
        let corpus =
            ". the x aa . the x ab . the x ac . the x ad . the x ae . the x af . the x ag .";
        let stream = words(corpus);
        let trigrams = NGramModel::new(&stream, 3, 5000).unwrap().export();
        let bigrams = NGramModel::new(&stream, 2, 5000).unwrap().export();
        let services = BasicServices::new(Dictionary::from_words(["the", "x"]));
        let corrector = Corrector::new(
            Arc::new(trigrams),
            Arc::new(bigrams),
            services,
            CorrectorSettings::default(),
        )
        .unwrap();

        let results = corrector.check("the x az");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].candidates.len(), 5);
        assert_eq!(results[0].candidates, vec!["aa", "ab", "ac", "ad", "ae"]);
    }

    #[test]
    fn test_forward_correction_changes_later_context() {
        let corrector = corrector(SHIRTS);
        let results = corrector.check("the grean shrt");

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].original, "grean");
        assert_eq!(results[0].candidates[0], "green");
        assert_eq!(results[1].original, "shrt");
        assert_eq!(results[1].candidates[0], "shirt");

        // Without the earlier correction the later word has no known context
        let (trigrams, bigrams) = maps(SHIRTS);
        let uncorrected = suggest_at(
            &words(". the grean shrt"),
            3,
            PartOfSpeech::Noun,
            &trigrams,
            &bigrams,
            &services(),
            &CorrectorSettings::default(),
        );
        assert!(uncorrected.is_empty());
    }

    #[test]
    fn test_check_is_idempotent() {
        let corrector = corrector(SHIRTS);
        let first = corrector.check("the grean shrt . the red sheo");
        let second = corrector.check("the grean shrt . the red sheo");
        assert_eq!(first, second);
    }

    #[test]
    fn test_check_batch_matches_check() {
        let corrector = corrector(SHIRTS);
        let texts = ["the grean shrt", "the red sheo", "the green grass", "tha green shirt"];
        let batch = corrector.check_batch(&texts, 3).unwrap();
        let sequential: Vec<Vec<CorrectionResult>> =
            texts.iter().map(|t| corrector.check(t)).collect();
        assert_eq!(batch, sequential);
        assert_eq!(corrector.check_batch(&texts, 1).unwrap(), sequential);
        assert!(corrector.check_batch::<&str>(&[], 4).unwrap().is_empty());
    }

    #[test]
    fn test_rejects_mismatched_stores() {
        let (trigrams, bigrams) = maps(SHIRTS);
        let err = Corrector::new(bigrams, trigrams, services(), CorrectorSettings::default());
        assert!(matches!(err, Err(Error::Configuration(_))));
    }
}
