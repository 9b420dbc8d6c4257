use thiserror::Error;

#[derive(Error, Debug)]
pub enum CopilotError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Language model error: {0}")]
    ModelError(String),

    #[error("Store error: {0}")]
    StoreError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CopilotError>;
