use thiserror::Error;

/// Errors raised by session store backends.
#[derive(Debug, Error)]
pub enum KvError {
    /// Underlying I/O failure (file backends).
    #[error("io error: {0}")]
    Io(String),

    /// Value could not be serialized or deserialized.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Backend-specific failure.
    #[error("backend error: {0}")]
    Backend(String),
}
