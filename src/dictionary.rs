//! Word list used to decide whether a token is spelled correctly.
//!
//! # Dictionary Format
//!
//! Dictionary files use a simple text format:
//! ```text
//! # Comments start with #
//! word [frequency]
//! the 1000000
//! able
//! ```
//!
//! Only the first column is read, so frequency lists can be used as they are.
//! Words are lower-cased on load, so membership tests are case-insensitive.
//! Without an explicit path the list compiled in from `dictionary/words.txt`
//! is used.

use ahash::AHashSet;
use log::info;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{Error, Result};

// Embedded at compile time
const EMBEDDED_DICTIONARY: &str = include_str!("../dictionary/words.txt");

/// A set of known words.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    /// Lower-cased words.
    words: AHashSet<String>,
}

impl Dictionary {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dictionary from an in-memory word list.
    ///
    /// # Example
    /// ```rust
    /// let dict = ngram_spell::dictionary::Dictionary::from_words(["able", "to"]);
    /// assert!(dict.contains("Able"));
    /// ```
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut dict = Self::new();
        for word in words {
            dict.insert(word.as_ref());
        }
        dict
    }

    /// Load the dictionary from `dictionary_path`, or from the embedded list.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or contains no words.
    pub fn load_from_path(dictionary_path: Option<&Path>) -> Result<Self> {
        let mut dict = Self::new();
        match dictionary_path {
            Some(path) => dict.load_dictionary_file(path)?,
            None => dict.load_builtin_dictionary()?,
        }
        info!("Dictionary loaded: {} words", dict.word_count());
        Ok(dict)
    }

    /// Add a word (lower-cased).
    pub fn insert(&mut self, word: &str) {
        let word = word.trim().to_lowercase();
        if !word.is_empty() {
            self.words.insert(word);
        }
    }

    /// Case-insensitive membership test.
    pub fn contains(&self, word: &str) -> bool {
        if self.words.contains(word) {
            return true;
        }
        self.words.contains(&word.to_lowercase())
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    fn load_builtin_dictionary(&mut self) -> Result<()> {
        let loaded_words = self.load_lines(EMBEDDED_DICTIONARY.lines());
        if loaded_words == 0 {
            return Err(Error::Dictionary("embedded word list is empty".to_string()));
        }

        info!("Loaded embedded dictionary with {} words", loaded_words);
        Ok(())
    }

    fn load_dictionary_file(&mut self, dict_path: &Path) -> Result<()> {
        let file = File::open(dict_path)?;
        let reader = BufReader::new(file);

        let mut lines = Vec::new();
        for line in reader.lines() {
            lines.push(line?);
        }

        let loaded_words = self.load_lines(lines.iter().map(String::as_str));
        if loaded_words == 0 {
            return Err(Error::Dictionary(format!(
                "{} contains no words",
                dict_path.display()
            )));
        }

        info!("Loaded dictionary from {}", dict_path.display());
        Ok(())
    }

    /// Parse `word [frequency]` lines; returns how many words were taken.
    fn load_lines<'a, I>(&mut self, lines: I) -> usize
    where
        I: Iterator<Item = &'a str>,
    {
        let mut loaded = 0usize;
        for line in lines {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some(word) = line.split_whitespace().next() else {
                continue;
            };

            self.insert(word);
            loaded += 1;
        }
        loaded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_embedded_dictionary() {
        let dict = Dictionary::load_from_path(None).unwrap();
        assert!(dict.contains("the"));
        assert!(dict.contains("water"));
        assert!(!dict.contains("btar"));
    }

    #[test]
    fn test_case_insensitive() {
        let dict = Dictionary::from_words(["European", "water"]);
        assert!(dict.contains("european"));
        assert!(dict.contains("WATER"));
    }

    #[test]
    fn test_load_file_with_frequencies() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# comment").unwrap();
        writeln!(file, "shirt 12").unwrap();
        writeln!(file, "grass").unwrap();
        writeln!(file).unwrap();
        file.flush().unwrap();

        let dict = Dictionary::load_from_path(Some(file.path())).unwrap();
        assert_eq!(dict.word_count(), 2);
        assert!(dict.contains("shirt"));
        assert!(dict.contains("grass"));
        assert!(!dict.contains("12"));
    }

    #[test]
    fn test_empty_file_is_an_error() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = Dictionary::load_from_path(Some(file.path())).unwrap_err();
        assert!(matches!(err, Error::Dictionary(_)));
    }
}
