use thiserror::Error;

/// Top-level error type for wapair.
#[derive(Debug, Error)]
pub enum PairError {
    /// Error from the messaging session (connect, send, group join).
    #[error("session error: {0}")]
    Session(String),

    /// Error from the on-disk auth state.
    #[error("store error: {0}")]
    Store(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
