use async_trait::async_trait;
use prompt_gateway::{Error, Result, llm::LlmClient};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};
use std::time::Duration;

/// Mock LLM client for testing
#[derive(Debug, Clone)]
pub struct MockLlmClient {
    pub prompts: Arc<Mutex<Vec<String>>>,
    /// Calls that got past the delay and produced a reply.
    pub completed: Arc<AtomicUsize>,
    reply: Reply,
    delay: Option<Duration>,
}

#[derive(Debug, Clone)]
enum Reply {
    Fixed(String),
    Echo,
    Fail(fn(String) -> Error, String),
}

impl MockLlmClient {
    /// Always answers with `response`.
    pub fn fixed(response: impl Into<String>) -> Self {
        Self::with_reply(Reply::Fixed(response.into()))
    }

    /// Answers with the prompt it was given.
    pub fn echo() -> Self {
        Self::with_reply(Reply::Echo)
    }

    /// Fails every call with a generation error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_reply(Reply::Fail(Error::Llm, message.into()))
    }

    /// Fails every call with a construction error.
    pub fn uninitialized(message: impl Into<String>) -> Self {
        Self::with_reply(Reply::Fail(Error::LlmInit, message.into()))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn completed_count(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn get_prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    fn with_reply(reply: Reply) -> Self {
        Self {
            prompts: Arc::new(Mutex::new(Vec::new())),
            completed: Arc::new(AtomicUsize::new(0)),
            reply,
            delay: None,
        }
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.completed.fetch_add(1, Ordering::SeqCst);

        match &self.reply {
            Reply::Fixed(response) => Ok(response.clone()),
            Reply::Echo => Ok(prompt.to_string()),
            Reply::Fail(make_error, message) => Err(make_error(message.clone())),
        }
    }
}
