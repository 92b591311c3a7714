//! Error types for the cosproxy core.

/// Core error type for cosproxy infrastructure.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// A bucket name or object key failed validation.
    #[error("invalid object location: {0}")]
    InvalidLocation(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience result type for cosproxy operations.
pub type ProxyResult<T> = Result<T, ProxyError>;
