//! Trait abstractions for runtime I/O
//!
//! The generation collaborator is the only remote call a turn makes; it is
//! behind [`Generator`] so turns can be driven by mocks in tests.

use crate::llm::{LlmError, LlmRequest, LlmService, MessageRole};
use crate::session::{Message, Role};
use async_trait::async_trait;
use std::sync::Arc;

/// Produces free text from a conversation history plus an extra instruction
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, history: &[Message], extra_prompt: &str) -> Result<String, LlmError>;
}

#[async_trait]
impl<T: Generator + ?Sized> Generator for Arc<T> {
    async fn generate(&self, history: &[Message], extra_prompt: &str) -> Result<String, LlmError> {
        (**self).generate(history, extra_prompt).await
    }
}

// ============================================================================
// Production Adapter
// ============================================================================

/// Adapter from a session history to an [`LlmService`] completion
pub struct LlmGenerator {
    service: Arc<dyn LlmService>,
    temperature: f32,
    max_tokens: u32,
}

impl LlmGenerator {
    pub fn new(service: Arc<dyn LlmService>, temperature: f32, max_tokens: u32) -> Self {
        Self {
            service,
            temperature,
            max_tokens,
        }
    }

    /// System messages are folded into the system prompt; the extra prompt
    /// becomes the final user message.
    fn build_request(&self, history: &[Message], extra_prompt: &str) -> LlmRequest {
        let system = history
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let mut request = LlmRequest::new(system);
        for message in history {
            let role = match message.role {
                Role::System => continue,
                Role::User => MessageRole::User,
                Role::Assistant => MessageRole::Assistant,
            };
            request = request.with_message(role, message.text.clone());
        }
        request = request.with_message(MessageRole::User, extra_prompt);
        request.temperature = Some(self.temperature);
        request.max_tokens = Some(self.max_tokens);
        request
    }
}

#[async_trait]
impl Generator for LlmGenerator {
    async fn generate(&self, history: &[Message], extra_prompt: &str) -> Result<String, LlmError> {
        let request = self.build_request(history, extra_prompt);
        let response = self.service.complete(&request).await?;
        Ok(response.text.trim().to_string())
    }
}
