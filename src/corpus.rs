//! Corpus ingestion: ordered token sources joined into one training stream.

use log::{debug, info};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::Result;
use crate::linguistics::LanguageServices;

/// Token placed in front of every stream and every checked sentence, so the
/// first real word has a full context window.
pub const BOUNDARY_TOKEN: &str = ".";

/// A named, ordered list of tokens.
#[derive(Debug, Clone)]
struct Source {
    name: String,
    tokens: Vec<String>,
}

/// Ordered collection of token sources.
///
/// Sources are concatenated in the order they were added. Tokens are
/// lower-cased on ingestion unless [`preserve_case`](Self::preserve_case) is
/// set, because the corrector matches contexts against lower-cased text.
#[derive(Debug, Clone)]
pub struct Corpus {
    sources: Vec<Source>,
    lowercase: bool,
}

impl Default for Corpus {
    fn default() -> Self {
        Self::new()
    }
}

impl Corpus {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            lowercase: true,
        }
    }

    /// Keep tokens exactly as they are given. Only affects sources added later.
    pub fn preserve_case(mut self) -> Self {
        self.lowercase = false;
        self
    }

    /// Add an already tokenized source.
    pub fn add_tokens<I, S>(&mut self, name: &str, tokens: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let lowercase = self.lowercase;
        let tokens: Vec<String> = tokens
            .into_iter()
            .map(|t| {
                let t: String = t.into();
                if lowercase {
                    t.to_lowercase()
                } else {
                    t
                }
            })
            .collect();
        debug!("Added source {:?} with {} tokens", name, tokens.len());
        self.sources.push(Source {
            name: name.to_string(),
            tokens,
        });
    }

    /// Tokenize `text` with `services` and add it as a source.
    pub fn add_text<L: LanguageServices>(&mut self, name: &str, text: &str, services: &L) {
        self.add_tokens(name, services.tokenize(text));
    }

    /// Read a UTF-8 text file, tokenize it and add it as a source named after the file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read.
    pub fn add_file<P, L>(&mut self, path: P, services: &L) -> Result<()>
    where
        P: AsRef<Path>,
        L: LanguageServices,
    {
        let path = path.as_ref();
        let mut contents = String::new();
        File::open(path)?.read_to_string(&mut contents)?;
        self.add_text(&path.display().to_string(), &contents, services);
        info!("Read corpus file {}", path.display());
        Ok(())
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Total number of tokens, boundary token excluded.
    pub fn token_count(&self) -> usize {
        self.sources.iter().map(|s| s.tokens.len()).sum()
    }

    /// The training stream: the boundary token followed by every source in order.
    pub fn stream(&self) -> Vec<String> {
        let mut stream = Vec::with_capacity(self.token_count() + 1);
        stream.push(BOUNDARY_TOKEN.to_string());
        for source in &self.sources {
            debug!("Streaming {} tokens from {:?}", source.tokens.len(), source.name);
            stream.extend(source.tokens.iter().cloned());
        }
        stream
    }
}
