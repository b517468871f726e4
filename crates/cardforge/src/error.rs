//! Error types for the cardforge library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for cardforge operations.
#[derive(Debug, Error)]
pub enum CardError {
    /// The file is neither a `.json` nor a `.png` card.
    #[error("Unsupported file type: {0} (expected .json or .png)")]
    UnsupportedFileType(String),

    /// Error reading or writing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A `.json` card that does not parse.
    #[error("Malformed JSON in '{path}': {source}")]
    MalformedJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Every PNG recovery strategy came up empty.
    #[error("No character data found in PNG")]
    NoEmbeddedData,

    /// Parsed data is not usable as a character card.
    #[error("Invalid card: {0}")]
    InvalidCard(String),

    /// The image handed to the exporter is not a PNG we can write into.
    #[error("Invalid PNG: {0}")]
    InvalidPng(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error saving or loading settings and exports.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// The AI provider failed to produce text.
    #[error("Generation failed: {0}")]
    Generation(String),

    /// The caller cancelled an in-flight generation.
    #[error("Generation cancelled")]
    Cancelled,

    /// The card lacks the fields a generation request needs.
    #[error("Incomplete card: {0}")]
    IncompleteCard(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Regex compilation error.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl CardError {
    /// Wrap an I/O error with the path it happened on.
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CardError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for cardforge operations.
pub type Result<T> = std::result::Result<T, CardError>;
