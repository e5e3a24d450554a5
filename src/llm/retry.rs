use super::LlmClient;
use crate::{Result, config::LlmConfig};
use async_trait::async_trait;
use std::time::Duration;
use tracing::warn;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u8,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &LlmConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.retry_base_delay_ms),
        }
    }

    /// Delay before retry number `attempt` (1-based): exponential backoff
    /// on the base delay plus up to one base delay of jitter.
    pub fn delay_for(&self, attempt: u8) -> Duration {
        let base_ms = u64::try_from(self.base_delay.as_millis()).unwrap_or(u64::MAX);
        if base_ms == 0 {
            return Duration::ZERO;
        }

        let exponent = u32::from(attempt.saturating_sub(1)).min(16);
        let backoff = base_ms.saturating_mul(2u64.pow(exponent));
        // v4 UUIDs are random, so their low bits are a good enough jitter source
        let jitter = (Uuid::new_v4().as_u128() % u128::from(base_ms)) as u64;

        Duration::from_millis(backoff.saturating_add(jitter))
    }
}

/// Retries transient failures of the wrapped client.
pub struct RetryingClient<C> {
    inner: C,
    policy: RetryPolicy,
}

impl<C: LlmClient> RetryingClient<C> {
    pub fn new(inner: C, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl<C: LlmClient> LlmClient for RetryingClient<C> {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let mut attempt: u8 = 0;

        loop {
            match self.inner.complete(prompt).await {
                Ok(completion) => return Ok(completion),
                Err(e) if e.is_transient() && attempt < self.policy.max_retries => {
                    attempt += 1;
                    let delay = self.policy.delay_for(attempt);
                    warn!(
                        "Transient LLM error (retry {}/{} in {:?}): {}",
                        attempt, self.policy.max_retries, delay, e
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
