//! Sessions: message history, dialogue state and reading history
//!
//! All state is process-local and volatile.

mod store;

pub use store::SessionStore;

use crate::state_machine::ConversationState;
use crate::system_prompt::SYSTEM_PROMPT;
use crate::trend::ReadingHistory;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// One entry of a session's append-only history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            created_at: Utc::now(),
        }
    }
}

/// One continuous conversation
#[derive(Debug)]
pub struct Session {
    pub id: String,
    messages: Vec<Message>,
    pub state: ConversationState,
    /// Shared with the store so it outlives a reset of this session
    pub readings: Arc<Mutex<ReadingHistory>>,
}

impl Session {
    /// Start a session whose history begins with the system prompt.
    pub fn new(id: impl Into<String>, readings: Arc<Mutex<ReadingHistory>>) -> Self {
        Self {
            id: id.into(),
            messages: vec![Message::new(Role::System, SYSTEM_PROMPT)],
            state: ConversationState::new(),
            readings,
        }
    }

    pub fn append(&mut self, role: Role, text: impl Into<String>) {
        self.messages.push(Message::new(role, text));
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Session(id={}, step={}, messages={})",
            self.id,
            self.state.step,
            self.message_count()
        )
    }
}
