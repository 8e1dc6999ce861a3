use thiserror::Error;

pub type Result<T, E = ServerError> = core::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("variable already registered: {0}")]
    Duplicate(String),
    #[error("variable not found: {0}")]
    NotFound(String),
    #[error("value type does not match variable: {0}")]
    TypeMismatch(String),
    #[error("{name}: {len} elements exceed capacity {capacity}")]
    TooLong {
        name: String,
        len: usize,
        capacity: usize,
    },
    #[error("backend error: {0}")]
    Backend(String),
}
