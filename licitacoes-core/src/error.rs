//! Error types for the licitacoes ecosystem.

use thiserror::Error;

/// Errors that can occur while talking to the data service or loading config.
#[derive(Error, Debug)]
pub enum LicitacaoError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// The backend answered, but with an error. The message is surfaced as-is.
    #[error("{0}")]
    Service(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Licitação não encontrada: {0}")]
    NotFound(String),
}

impl From<serde_json::Error> for LicitacaoError {
    fn from(err: serde_json::Error) -> Self {
        LicitacaoError::Serialization(err.to_string())
    }
}

/// Result type alias for licitacoes operations.
pub type LicitacaoResult<T> = Result<T, LicitacaoError>;
