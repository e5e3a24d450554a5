use axum::http::StatusCode;
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("LLM client initialization failed: {0}")]
    LlmInit(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("LLM backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("LLM backend returned {status}: {message}")]
    BackendStatus { status: u16, message: String },

    #[error("LLM request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid lifecycle transition: {current} -> {requested}")]
    InvalidTransition { current: String, requested: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn llm_init(msg: impl Into<String>) -> Self {
        Self::LlmInit(msg.into())
    }

    pub fn llm(msg: impl Into<String>) -> Self {
        Self::Llm(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether another attempt against the backend could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::BackendUnavailable(_) | Self::Timeout(_) => true,
            Self::BackendStatus { status, .. } => *status >= 500,
            Self::Network(e) => e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }

    /// HTTP status reported to the caller when this error ends a request.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::LlmInit(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::Llm(_)
            | Self::BackendUnavailable(_)
            | Self::BackendStatus { .. }
            | Self::Network(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
