//! Mock generators for testing turns without a network

use super::traits::Generator;
use crate::llm::LlmError;
use crate::session::Message;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// One recorded `generate` call
#[derive(Debug, Clone)]
pub struct GenerationCall {
    pub history: Vec<Message>,
    pub extra_prompt: String,
}

/// Generator that returns queued responses
#[derive(Default)]
pub struct MockGenerator {
    responses: Mutex<VecDeque<Result<String, LlmError>>>,
    calls: Mutex<Vec<GenerationCall>>,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_response(&self, text: impl Into<String>) {
        self.responses.lock().unwrap().push_back(Ok(text.into()));
    }

    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn recorded_calls(&self) -> Vec<GenerationCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Generator for MockGenerator {
    async fn generate(&self, history: &[Message], extra_prompt: &str) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push(GenerationCall {
            history: history.to_vec(),
            extra_prompt: extra_prompt.to_string(),
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock response queued")))
    }
}

/// Generator that blocks until released, for lock-discipline tests
pub struct GatedGenerator {
    pub started: Arc<Notify>,
    pub release: Arc<Notify>,
    text: String,
}

impl GatedGenerator {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            started: Arc::new(Notify::new()),
            release: Arc::new(Notify::new()),
            text: text.into(),
        }
    }
}

#[async_trait]
impl Generator for GatedGenerator {
    async fn generate(&self, _history: &[Message], _extra_prompt: &str) -> Result<String, LlmError> {
        self.started.notify_one();
        self.release.notified().await;
        Ok(self.text.clone())
    }
}
