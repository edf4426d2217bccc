use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChainError {
    #[error("Invalid search request: {0}")]
    InvalidRequest(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, ChainError>;
