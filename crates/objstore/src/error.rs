use thiserror::Error;

/// Errors that can occur during object-store operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Conditional create failed because the object already exists.
    #[error("object already exists: {0}")]
    AlreadyExists(String),

    /// The requested object does not exist.
    #[error("object not found: {0}")]
    NotFound(String),

    /// The per-call deadline elapsed before the backend responded.
    #[error("{op} {key} timed out")]
    Timeout { op: &'static str, key: String },

    /// Any other backend failure.
    #[error("object store error: {0}")]
    Backend(String),
}

impl Error {
    /// Returns true when the error signals a failed conditional create.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Error::AlreadyExists(_))
    }

    /// Returns true when the error signals a missing object.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

/// Result type for object-store operations.
pub type Result<T> = std::result::Result<T, Error>;
