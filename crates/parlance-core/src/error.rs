use thiserror::Error;

/// Top-level error type for the Parlance system.
///
/// Each variant corresponds to a failure class that can surface from the
/// stores or the agent runtime. Crates closer to the conversation boundary
/// define their own error types and implement `From<ParlanceError>` so the
/// `?` operator works across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParlanceError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Store file corrupt: {0}")]
    StorageCorrupt(String),

    #[error("Speech service error: {0}")]
    Speech(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for ParlanceError {
    fn from(err: toml::de::Error) -> Self {
        ParlanceError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for ParlanceError {
    fn from(err: toml::ser::Error) -> Self {
        ParlanceError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for ParlanceError {
    fn from(err: serde_json::Error) -> Self {
        ParlanceError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Parlance operations.
pub type Result<T> = std::result::Result<T, ParlanceError>;
