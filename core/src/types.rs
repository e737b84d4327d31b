use std::io;
use std::path::PathBuf;

use crate::{config::ConfigError, crypto::CryptoError};

/// Unified stream error covering I/O, crypto setup, configuration and malformed input.
/// - Ergonomic `From<T>` impls enable `?` across the pipeline.
/// - `ChannelClosed` is a *symptom*: it is what a stage sees when a neighbour
///   has already failed. The orchestrator prefers any other error as the cause.
#[derive(Debug)]
pub enum StreamError {
    /// I/O error, with the file it happened on when known.
    Io { path: Option<PathBuf>, source: io::Error },

    /// Cryptographic setup or runtime error (key length, block length, RNG).
    Crypto(CryptoError),

    /// Configuration error (sample count, paths).
    Config(ConfigError),

    /// Input that cannot be a valid ciphertext (e.g. shorter than one IV).
    MalformedInput(String),

    /// A neighbouring stage hung up before the sentinel was exchanged.
    ChannelClosed(&'static str),

    /// A stage thread panicked.
    StagePanicked(&'static str),

    /// Generic high-level validation with a descriptive message.
    Validation(String),
}

impl StreamError {
    /// Attach a path to an I/O error.
    pub fn io_at(path: impl Into<PathBuf>, source: io::Error) -> Self {
        StreamError::Io { path: Some(path.into()), source }
    }

    /// Fill in the path of a path-less I/O error; other errors pass through.
    pub fn at_path(self, path: &std::path::Path) -> Self {
        match self {
            StreamError::Io { path: None, source } => StreamError::io_at(path, source),
            other => other,
        }
    }

    /// True when this error only reports that a neighbour went away.
    pub fn is_channel_closed(&self) -> bool {
        matches!(self, StreamError::ChannelClosed(_))
    }
}

impl std::fmt::Display for StreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamError::Io { path: Some(p), source } => {
                write!(f, "I/O error on {}: {}", p.display(), source)
            }
            StreamError::Io { path: None, source } => write!(f, "I/O error: {}", source),
            StreamError::Crypto(e) => write!(f, "crypto error: {}", e),
            StreamError::Config(e) => write!(f, "config error: {}", e),
            StreamError::MalformedInput(msg) => write!(f, "malformed input: {}", msg),
            StreamError::ChannelClosed(msg) => write!(f, "pipeline channel closed: {}", msg),
            StreamError::StagePanicked(stage) => write!(f, "pipeline stage panicked: {}", stage),
            StreamError::Validation(msg) => write!(f, "validation error: {}", msg),
        }
    }
}

impl std::error::Error for StreamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StreamError::Io { source, .. } => Some(source),
            StreamError::Crypto(e) => Some(e),
            StreamError::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for StreamError {
    fn from(e: io::Error) -> Self {
        StreamError::Io { path: None, source: e }
    }
}

impl From<CryptoError> for StreamError {
    fn from(e: CryptoError) -> Self {
        StreamError::Crypto(e)
    }
}

impl From<ConfigError> for StreamError {
    fn from(e: ConfigError) -> Self {
        StreamError::Config(e)
    }
}
