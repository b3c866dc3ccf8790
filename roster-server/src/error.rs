use thiserror::Error;

use crate::schema::SchemaError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid schema: {0}")]
    Schema(#[from] SchemaError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to initialize logging: {0}")]
    Logging(String)
}
