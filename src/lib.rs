//! ngram-spell - n-gram language models and context-aware spelling correction.
//!
//! # Overview
//!
//! Building (offline, once per corpus):
//! - Token sources are joined into one stream behind a boundary token
//! - An n-gram model counts every window of n and n - 1 tokens
//! - The counts are exported as context → ranked words and stored per n
//!
//! Checking (online, any number of times):
//! - The text is tokenized, tagged and lemmatized
//! - Tokens outside the dictionary are flagged
//! - Candidates following the previous two words and the previous word are
//!   scored by edit distance and merged into one ranked list
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  Corpus         │ ← Ordered token sources (corpus.rs)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │  NGramModel     │ ← Window counts, probabilities (ngram.rs)
//! └────────┬────────┘
//!          │ export()
//!          ▼
//! ┌─────────────────┐
//! │  NGramStore     │ ← One ContextMap per n on disk (store.rs)
//! └────────┬────────┘
//!          │ load(2), load(3)
//!          ▼
//! ┌─────────────────┐
//! │  Corrector      │ ← Detection, ranking, merge (corrector.rs)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ LanguageServices│ ← Tokens, tags, lemmas, distance (linguistics.rs)
//! └─────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use ngram_spell::corpus::Corpus;
//! use ngram_spell::corrector::{Corrector, CorrectorSettings};
//! use ngram_spell::dictionary::Dictionary;
//! use ngram_spell::linguistics::BasicServices;
//! use ngram_spell::ngram::BuildOptions;
//! use ngram_spell::store::{build_stores, NGramStore};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let store = NGramStore::new(dir.path());
//! let services = BasicServices::new(Dictionary::from_words(["the", "green", "shirt"]));
//!
//! let mut corpus = Corpus::new();
//! corpus.add_text("sample", "The green shirt. The green shirt.", &services);
//! build_stores(&corpus, &[2, 3], 5000, BuildOptions::default(), &store).unwrap();
//!
//! let corrector = Corrector::from_store(&store, services, CorrectorSettings::default()).unwrap();
//! let results = corrector.check("The green shrt");
//! assert_eq!(results[0].candidates, vec!["shirt"]);
//! ```

pub mod config;
pub mod corpus;
pub mod corrector;
pub mod dictionary;
pub mod distance;
pub mod error;
pub mod linguistics;
pub mod ngram;
pub mod store;

pub use corrector::{CorrectionResult, Corrector, CorrectorSettings};
pub use error::{Error, Result};
pub use store::{build_stores, ContextMap, NGramStore};
