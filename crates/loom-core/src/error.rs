//! Error types for Loom

use thiserror::Error;

/// Main error type for Loom
#[derive(Error, Debug)]
pub enum LoomError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{provider} key missing. Add it in cloud settings or set {hint}.")]
    MissingCredential { provider: String, hint: String },

    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    #[error("Instruction is empty")]
    EmptyInstruction,

    #[error("A generation round is already in progress")]
    RoundInFlight,

    #[error("{provider} error ({status}): {body}")]
    ProviderHttp {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("Publish failed: {0}")]
    Publish(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl LoomError {
    /// Whether the error came from talking to an upstream provider
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            LoomError::ProviderHttp { .. }
                | LoomError::Transport(_)
                | LoomError::MalformedResponse(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, LoomError>;
