//! Error types for the risk engine.
//!
//! Catalog and profile problems, retrieval-index I/O and precondition
//! violations all surface through [`RiskError`].

use std::path::PathBuf;

/// The main error type for riskmap operations.
#[derive(Debug, thiserror::Error)]
pub enum RiskError {
    /// I/O error (file read/write, permissions, etc.)
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: Option<PathBuf>,
        #[source]
        source: std::io::Error,
    },

    /// Regex compilation error
    #[error("Invalid regex pattern '{pattern}': {source}")]
    Regex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML catalog parse error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// PDF could not be parsed
    #[error("Failed to read PDF {path:?}: {message}")]
    Pdf { path: PathBuf, message: String },

    /// Catalog content is inconsistent
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    /// A scenario or lookup referenced an id that is not in the catalog
    #[error("Unknown {kind} id '{id}'")]
    UnknownId { kind: &'static str, id: String },

    /// Fine-tuning value outside the allowed scale
    #[error("Override for '{id}' must lie in [1.0, 5.0], got {value}")]
    InvalidOverride { id: String, value: f64 },

    /// Generic error for external collaborators
    #[error("{context}: {message}")]
    External { context: String, message: String },
}

/// Result type alias using RiskError
pub type RiskResult<T> = Result<T, RiskError>;

impl RiskError {
    /// Create an I/O error with path context
    pub fn io(source: std::io::Error, path: impl Into<Option<PathBuf>>) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a regex error with pattern context
    pub fn regex(source: regex::Error, pattern: impl Into<String>) -> Self {
        Self::Regex {
            pattern: pattern.into(),
            source,
        }
    }

    /// Create a PDF error with path context
    pub fn pdf(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Pdf {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn unknown(kind: &'static str, id: impl Into<String>) -> Self {
        Self::UnknownId {
            kind,
            id: id.into(),
        }
    }

    /// Create an external error with context
    pub fn external(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::External {
            context: context.into(),
            message: message.into(),
        }
    }
}

/// Convert from raw I/O errors (without path context)
impl From<std::io::Error> for RiskError {
    fn from(source: std::io::Error) -> Self {
        Self::Io { path: None, source }
    }
}
