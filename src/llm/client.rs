use super::types::*;
use crate::{Error, Result, config::LlmConfig};
use async_trait::async_trait;
use reqwest::Url;
use std::time::Duration;
use tracing::debug;

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generates a completion for a single prompt.
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Client for an Ollama-compatible `/api/generate` endpoint.
pub struct OllamaClient {
    client: reqwest::Client,
    generate_url: Url,
    model: String,
    timeout: Duration,
}

impl OllamaClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        if config.model.trim().is_empty() {
            return Err(Error::llm_init("model name is empty"));
        }

        // Url::join drops the last path segment unless it ends with '/'
        let base = if config.base_url.ends_with('/') {
            config.base_url.clone()
        } else {
            format!("{}/", config.base_url)
        };
        let base = Url::parse(&base)
            .map_err(|e| Error::llm_init(format!("invalid base URL '{}': {}", config.base_url, e)))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(Error::llm_init(format!(
                "unsupported URL scheme '{}'",
                base.scheme()
            )));
        }
        let generate_url = base
            .join("api/generate")
            .map_err(|e| Error::llm_init(format!("invalid generate URL: {}", e)))?;

        let timeout = config.request_timeout();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::llm_init(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            generate_url,
            model: config.model.clone(),
            timeout,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn generate_url(&self) -> &Url {
        &self.generate_url
    }

    fn classify(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::Timeout(self.timeout)
        } else if e.is_connect() {
            Error::BackendUnavailable(e.to_string())
        } else if e.is_decode() {
            Error::llm(format!("Failed to parse generate response: {}", e))
        } else {
            Error::Network(e)
        }
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        debug!(
            "Requesting completion from {} with model {} ({} chars)",
            self.generate_url,
            self.model,
            prompt.len()
        );

        let request = GenerateRequest::new(&self.model, prompt);
        let response = self
            .client
            .post(self.generate_url.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<BackendError>(&body)
                .map(|b| b.error)
                .unwrap_or(body);
            return Err(Error::BackendStatus {
                status: status.as_u16(),
                message,
            });
        }

        let generated: GenerateResponse = response.json().await.map_err(|e| self.classify(e))?;

        debug!(
            "Received completion ({} chars, done: {})",
            generated.response.len(),
            generated.done
        );

        Ok(generated.response)
    }
}

/// Stands in for a backend client that could not be constructed. Every
/// call fails with the original construction error so the server keeps
/// running and reports the problem per request.
pub struct UnavailableClient {
    reason: String,
}

impl UnavailableClient {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl LlmClient for UnavailableClient {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        Err(Error::llm_init(self.reason.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn create_test_config() -> LlmConfig {
        LlmConfig {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3".to_string(),
            ..LlmConfig::default()
        }
    }

    #[test]
    fn test_ollama_client_creation() {
        let client = OllamaClient::new(&create_test_config()).unwrap();

        assert_eq!(client.model(), "llama3");
        assert_eq!(
            client.generate_url().as_str(),
            "http://localhost:11434/api/generate"
        );
    }

    #[test]
    fn test_base_url_with_path_prefix() {
        let mut config = create_test_config();
        config.base_url = "http://gpu-box:8000/ollama".to_string();

        let client = OllamaClient::new(&config).unwrap();
        assert_eq!(
            client.generate_url().as_str(),
            "http://gpu-box:8000/ollama/api/generate"
        );
    }

    #[test]
    fn test_invalid_base_url_is_init_error() {
        let mut config = create_test_config();
        config.base_url = "not a url".to_string();

        let result = OllamaClient::new(&config);
        assert!(matches!(result, Err(Error::LlmInit(_))));
    }

    #[test]
    fn test_unsupported_scheme_is_init_error() {
        let mut config = create_test_config();
        config.base_url = "ftp://localhost:11434".to_string();

        let result = OllamaClient::new(&config);
        assert!(matches!(result, Err(Error::LlmInit(_))));
    }

    #[test]
    fn test_empty_model_is_init_error() {
        let mut config = create_test_config();
        config.model = "  ".to_string();

        let result = OllamaClient::new(&config);
        assert!(matches!(result, Err(Error::LlmInit(_))));
    }

    #[tokio::test]
    async fn test_unavailable_client_reports_reason() {
        let client = UnavailableClient::new("invalid base URL");

        let err = client.complete("hello").await.unwrap_err();
        assert!(matches!(err, Error::LlmInit(ref reason) if reason == "invalid base URL"));
    }
}
