use thiserror::Error;

pub type Result<T, E = TransportError> = core::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("endpoint unreachable: {0}")]
    Connect(String),
    #[error("I/O error: {0}")]
    Io(String),
    #[error("channel closed")]
    Closed,
    #[error("invalid metadata: {0}")]
    Metadata(String),
    #[error("unsupported dtype: {0}")]
    UnsupportedDtype(String),
    #[error("invalid shape: {0}")]
    InvalidShape(String),
    #[error("payload is {actual} bytes, metadata declares {expected}")]
    ShapeMismatch { expected: usize, actual: usize },
}

impl TransportError {
    /// Errors caused by the content of a single message rather than the channel.
    pub fn is_decode(&self) -> bool {
        matches!(
            self,
            TransportError::Metadata(_)
                | TransportError::UnsupportedDtype(_)
                | TransportError::InvalidShape(_)
                | TransportError::ShapeMismatch { .. }
        )
    }
}
