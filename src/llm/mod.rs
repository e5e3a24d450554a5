pub mod client;
pub mod retry;
pub mod types;

pub use client::*;
pub use retry::*;
pub use types::*;

use crate::{Error, config::LlmConfig};
use std::sync::Arc;
use tracing::{error, info};

/// Builds the backend client used by the request handlers.
///
/// A construction failure does not stop the server: the returned client
/// answers every call with the construction error instead.
pub fn connect(config: &LlmConfig) -> Arc<dyn LlmClient> {
    match OllamaClient::new(config) {
        Ok(client) => {
            info!(
                "LLM backend configured: {} (model: {})",
                client.generate_url(),
                client.model()
            );
            Arc::new(RetryingClient::new(client, RetryPolicy::from_config(config)))
        }
        Err(e) => {
            error!("LLM backend unavailable, /run will fail until fixed: {}", e);
            let reason = match e {
                Error::LlmInit(reason) => reason,
                other => other.to_string(),
            };
            Arc::new(UnavailableClient::new(reason))
        }
    }
}
