//! Context maps and their on-disk stores.
//!
//! A [`ContextMap`] is what the corrector actually reads: for every context of
//! `n - 1` tokens, the words seen after it with their counts, most frequent
//! first. An [`NGramStore`] keeps one map per order `n` in a directory:
//!
//! ```text
//! <dir>/2grams.bin
//! <dir>/3grams.bin
//! ```
//!
//! Artifacts are written to a temporary file in the same directory and then
//! renamed over the target, so a reader never sees a half-written store.

use ahash::AHashMap;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;
use tempfile::NamedTempFile;

use crate::corpus::Corpus;
use crate::error::{Error, Result};
use crate::ngram::{BuildOptions, NGramModel};

/// A word observed after a context, with how often.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextEntry {
    pub word: String,
    pub count: u64,
}

/// Context → candidate words, ordered by descending count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextMap {
    n: usize,
    groups: AHashMap<Vec<String>, Vec<ContextEntry>>,
}

impl ContextMap {
    /// Create an empty map for contexts of an `n`-gram model.
    pub fn new(n: usize) -> Self {
        Self {
            n,
            groups: AHashMap::new(),
        }
    }

    /// The model order this map was exported from.
    pub fn order(&self) -> usize {
        self.n
    }

    /// Append `entry` to the candidates of `context`.
    ///
    /// Callers push entries in rank order; the map does not reorder them.
    pub fn push(&mut self, context: Vec<String>, entry: ContextEntry) {
        debug_assert_eq!(context.len() + 1, self.n);
        self.groups.entry(context).or_default().push(entry);
    }

    /// Ranked candidates for `context`, or `None` if it was never observed.
    pub fn get(&self, context: &[String]) -> Option<&[ContextEntry]> {
        self.groups.get(context).map(Vec::as_slice)
    }

    /// Like [`get`](Self::get), but an unseen context yields no candidates.
    pub fn candidates(&self, context: &[String]) -> &[ContextEntry] {
        self.get(context).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[String], &[ContextEntry])> {
        self.groups.iter().map(|(k, v)| (k.as_slice(), v.as_slice()))
    }

    /// Number of distinct contexts.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Serialized form: groups sorted by context so equal maps give equal bytes.
#[derive(Serialize, Deserialize)]
struct StoredContextMap {
    n: usize,
    groups: Vec<(Vec<String>, Vec<ContextEntry>)>,
}

impl From<&ContextMap> for StoredContextMap {
    fn from(map: &ContextMap) -> Self {
        let mut groups: Vec<(Vec<String>, Vec<ContextEntry>)> = map
            .groups
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        groups.sort_by(|a, b| a.0.cmp(&b.0));
        Self { n: map.n, groups }
    }
}

impl From<StoredContextMap> for ContextMap {
    fn from(stored: StoredContextMap) -> Self {
        Self {
            n: stored.n,
            groups: stored.groups.into_iter().collect(),
        }
    }
}

/// Directory holding one persisted [`ContextMap`] per order `n`.
#[derive(Debug, Clone)]
pub struct NGramStore {
    dir: PathBuf,
}

impl NGramStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    /// Location of the artifact for order `n`.
    pub fn path_for(&self, n: usize) -> PathBuf {
        self.dir.join(format!("{n}grams.bin"))
    }

    /// Persist `map` under its order, replacing any earlier artifact.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created or the file written.
    pub fn save(&self, map: &ContextMap) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(map.order());

        let temp_file = NamedTempFile::new_in(&self.dir)?;
        {
            let mut writer = BufWriter::new(temp_file.as_file());
            bincode::serialize_into(&mut writer, &StoredContextMap::from(map))?;
            writer.flush()?;
        }
        temp_file.persist(&path).map_err(|e| e.error)?;

        info!(
            "Saved {}-gram store with {} contexts to {}",
            map.order(),
            map.len(),
            path.display()
        );
        Ok(path)
    }

    /// Load the map for order `n`.
    ///
    /// # Errors
    /// - [`Error::StoreNotFound`] if no artifact exists for `n`
    /// - [`Error::Store`] if the artifact holds a different order
    pub fn load(&self, n: usize) -> Result<ContextMap> {
        let path = self.path_for(n);
        if !path.is_file() {
            return Err(Error::StoreNotFound { n, path });
        }

        let reader = BufReader::new(File::open(&path)?);
        let stored: StoredContextMap = bincode::deserialize_from(reader)?;
        if stored.n != n {
            return Err(Error::store(format!(
                "{} holds a {}-gram map, expected {}",
                path.display(),
                stored.n,
                n
            )));
        }

        let map = ContextMap::from(stored);
        info!(
            "Loaded {}-gram store with {} contexts from {}",
            n,
            map.len(),
            path.display()
        );
        Ok(map)
    }
}

/// Build and persist one store per order in `n_values` from `corpus`.
///
/// Models are built one at a time so only a single set of counts is held in
/// memory alongside the stream.
///
/// # Errors
/// Fails on the first invalid order or I/O error; stores written before the
/// failure are left in place.
pub fn build_stores(
    corpus: &Corpus,
    n_values: &[usize],
    max_vocabulary_size: usize,
    options: BuildOptions,
    store: &NGramStore,
) -> Result<Vec<PathBuf>> {
    let stream = corpus.stream();
    debug!(
        "Building stores for n = {:?} over {} tokens from {} sources",
        n_values,
        stream.len(),
        corpus.source_count()
    );

    let mut paths = Vec::with_capacity(n_values.len());
    for &n in n_values {
        let model = NGramModel::with_options(&stream, n, max_vocabulary_size, options)?;
        paths.push(store.save(&model.export())?);
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(word: &str, count: u64) -> ContextEntry {
        ContextEntry {
            word: word.to_string(),
            count,
        }
    }

    fn key(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn sample_map() -> ContextMap {
        let mut map = ContextMap::new(3);
        map.push(key(&["the", "green"]), entry("grass", 3));
        map.push(key(&["the", "green"]), entry("shirt", 2));
        map.push(key(&["green", "grass"]), entry(".", 3));
        map
    }

    #[test]
    fn test_missing_context_yields_no_candidates() {
        let map = sample_map();
        assert!(map.get(&key(&["a", "b"])).is_none());
        assert!(map.candidates(&key(&["a", "b"])).is_empty());
        assert_eq!(map.candidates(&key(&["the", "green"])).len(), 2);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = NGramStore::new(dir.path());
        let map = sample_map();

        let path = store.save(&map).unwrap();
        assert_eq!(path, dir.path().join("3grams.bin"));
        assert!(path.is_file());

        let loaded = store.load(3).unwrap();
        assert_eq!(loaded, map);
        assert_eq!(
            loaded.get(&key(&["the", "green"])).unwrap(),
            &[entry("grass", 3), entry("shirt", 2)]
        );
    }

    #[test]
    fn test_save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = NGramStore::new(dir.path());
        store.save(&sample_map()).unwrap();

        let mut replacement = ContextMap::new(3);
        replacement.push(key(&["a", "b"]), entry("c", 1));
        store.save(&replacement).unwrap();

        assert_eq!(store.load(3).unwrap(), replacement);
    }

    #[test]
    fn test_load_missing_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = NGramStore::new(dir.path().join("nothing-here"));
        let err = store.load(2).unwrap_err();
        assert!(matches!(err, Error::StoreNotFound { n: 2, .. }));
    }

    #[test]
    fn test_load_rejects_wrong_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = NGramStore::new(dir.path());
        store.save(&sample_map()).unwrap();
        fs::rename(store.path_for(3), store.path_for(2)).unwrap();

        assert!(matches!(store.load(2), Err(Error::Store(_))));
    }

    #[test]
    fn test_artifacts_are_reproducible() {
        let dir = tempfile::tempdir().unwrap();
        let first = NGramStore::new(dir.path().join("first"));
        let second = NGramStore::new(dir.path().join("second"));

        let mut corpus = Corpus::new();
        corpus.add_tokens(
            "shirts",
            key(&[
                "the", "green", "shirt", ".", "the", "green", "grass", ".", "the", "red", "shoe",
            ]),
        );

        build_stores(&corpus, &[2, 3], 100, BuildOptions::default(), &first).unwrap();
        build_stores(&corpus, &[2, 3], 100, BuildOptions::default(), &second).unwrap();

        for n in [2, 3] {
            let a = fs::read(first.path_for(n)).unwrap();
            let b = fs::read(second.path_for(n)).unwrap();
            assert_eq!(a, b, "{n}-gram artifacts differ");
        }
    }

    #[test]
    fn test_build_stores_rejects_bad_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = NGramStore::new(dir.path());
        let corpus = Corpus::new();
        let err = build_stores(&corpus, &[0], 100, BuildOptions::default(), &store).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }
}
