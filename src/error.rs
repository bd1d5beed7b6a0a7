//! Error types shared by the model builder, the store and the corrector.
//!
//! A context that is missing from a [`ContextMap`](crate::store::ContextMap)
//! is not represented here: lookups simply yield no candidates.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while building, persisting or querying models.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid build parameters; aborts model construction.
    #[error("invalid model configuration: {0}")]
    Configuration(String),

    /// A gram whose length differs from the model order.
    #[error("expected a gram of length {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// The context of a gram was never observed, so its probability has no denominator.
    #[error("probability undefined: context {context:?} was never observed")]
    UndefinedProbability { context: Vec<String> },

    /// No artifact for this order has been built yet.
    #[error("no {n}-gram store at {path}; build the stores before checking text")]
    StoreNotFound { n: usize, path: PathBuf },

    /// An artifact exists but does not hold what was asked for.
    #[error("store error: {0}")]
    Store(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("config error: {0}")]
    Config(#[from] confy::ConfyError),

    #[error("dictionary error: {0}")]
    Dictionary(String),

    #[error("failed to start worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

impl Error {
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Error::Configuration(msg.into())
    }

    pub fn store<S: Into<String>>(msg: S) -> Self {
        Error::Store(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
