use thiserror::Error;
use variable_server::ServerError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("registering variable {name}: {source}")]
    Register {
        name: String,
        #[source]
        source: ServerError,
    },
    #[error("metrics: {0}")]
    Metrics(String),
}
