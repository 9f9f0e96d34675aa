//! Error types for the anomaly detection service.

use crate::llm::LlmError;
use thiserror::Error;

/// Result type alias for anomaly detection operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for anomaly detection operations
#[derive(Debug, Error)]
pub enum Error {
    /// Unsupported detection method name
    #[error("Unsupported detection method: {0}")]
    UnsupportedMethod(String),

    /// Invalid configuration error
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Storage backend error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Text-completion collaborator error
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Input validation error
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// 呼び出し前に拒否される設定エラーかどうか
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedMethod(_) | Error::InvalidConfiguration(_)
        )
    }
}
