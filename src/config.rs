use log::warn;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ngram::BuildOptions;

const APP_NAME: &str = "ngram-spell";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the `<n>grams.bin` stores.
    pub store_dir: PathBuf,
    /// Orders built by `build` when none are given on the command line.
    pub n_values: Vec<usize>,
    pub max_vocabulary_size: usize,
    pub max_distance: usize,
    pub max_suggestions: usize,
    /// Word list used instead of the embedded one.
    pub dictionary_path: Option<PathBuf>,
    pub fold_rare_words: bool,
    /// Worker threads for checking files line by line.
    pub workers: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_dir: default_store_dir(),
            n_values: vec![2, 3],
            max_vocabulary_size: 5000,
            max_distance: 4,
            max_suggestions: 5,
            dictionary_path: None,
            fold_rare_words: false,
            workers: 4,
        }
    }
}

fn default_store_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
        .join("stores")
}

impl Config {
    pub fn load() -> Result<Self, confy::ConfyError> {
        match confy::load(APP_NAME, Some("config")) {
            Ok(config) => Ok(config),
            Err(err) => {
                warn!("Failed to load config, using defaults: {err}");
                Ok(Self::default())
            }
        }
    }

    pub fn save(&self) -> Result<(), confy::ConfyError> {
        confy::store(APP_NAME, Some("config"), self)
    }

    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            fold_rare_words: self.fold_rare_words,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corrector::CorrectorSettings;

    #[test]
    fn test_defaults_match_corrector_settings() {
        let config = Config::default();
        let settings = CorrectorSettings::from(&config);
        assert_eq!(settings, CorrectorSettings::default());
        assert_eq!(config.n_values, vec![2, 3]);
        assert!(config.store_dir.ends_with("stores"));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "max_distance = 2\n").unwrap();

        let config: Config = confy::load_path(&path).unwrap();
        assert_eq!(config.max_distance, 2);
        assert_eq!(config.max_suggestions, 5);
        assert!(!config.build_options().fold_rare_words);
    }
}
