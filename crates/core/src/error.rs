//! Error types shared across the workspace

use thiserror::Error;

/// Result alias using the core error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the scoring pipeline and its collaborators
///
/// Caller errors (`NotFound`, `Validation`) are reported immediately and never
/// retried. Everything else is an infrastructure failure that the HTTP layer
/// turns into a 500.
#[derive(Error, Debug)]
pub enum Error {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Annotation error: {0}")]
    Annotation(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Short machine-readable kind used in API envelopes
    pub fn kind(&self) -> &'static str {
        match self {
            Error::NotFound(_) => "not_found",
            Error::Validation(_) => "validation",
            Error::Storage(_) => "storage",
            Error::Annotation(_) => "annotation",
            Error::Serialization(_) => "serialization",
        }
    }

    /// Whether the error was caused by the caller rather than the service
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Error::NotFound(_) | Error::Validation(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
