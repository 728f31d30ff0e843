//! Turn orchestration
//!
//! A turn holds its session's lock from the transition until the reply is
//! appended, including the generation call. Other sessions never wait on it:
//! the store's map lock is not held while a session lock is.

pub mod traits;

#[cfg(test)]
pub mod testing;

pub use traits::*;

use crate::session::{Role, SessionStore};
use crate::state_machine::{transition, ContextTag, Decision, Step};
use crate::system_prompt::{generation_prompt, GENERATION_FALLBACK};
use crate::trend::ReadingStats;
use serde::Serialize;
use std::sync::Arc;

/// Outcome of one user message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnReply {
    pub session_id: String,
    pub reply: String,
    pub quick_actions: Vec<String>,
    pub context: ContextTag,
    pub medical_attention: bool,
    pub generation_failed: bool,
    pub step: Step,
}

/// Drives conversations for every session in a store
pub struct ChatRuntime<G = Arc<dyn Generator>> {
    store: SessionStore,
    generator: G,
}

impl<G: Generator> ChatRuntime<G> {
    pub fn new(generator: G) -> Self {
        Self {
            store: SessionStore::new(),
            generator,
        }
    }

    #[cfg(test)]
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Handle one inbound message for the given (or a fresh) session.
    pub async fn handle_turn(&self, session_id: Option<&str>, message: &str) -> TurnReply {
        // A reset can remove the session while we wait for its lock
        let mut session = loop {
            let (handle, _) = self.store.get_or_create(session_id).await;
            let session = handle.clone().lock_owned().await;
            if self.store.is_current(&session.id, &handle).await {
                break session;
            }
            tracing::debug!(session_id = %session.id, "Session reset while waiting, retrying");
        };
        let session_id = session.id.clone();

        let result = {
            let mut readings = session.readings.lock().await;
            transition(&session.state, message, &mut readings)
        };
        session.append(Role::User, message);
        session.state = result.new_state;

        let context = session.state.context;
        let step = session.state.step;
        let medical_attention = session.state.last_urgent;

        tracing::debug!(
            session_id = %session_id,
            step = %step,
            context = %context,
            generation = result.decision.is_generation(),
            "Turn decided"
        );

        let mut reply = TurnReply {
            session_id,
            reply: String::new(),
            quick_actions: Vec::new(),
            context,
            medical_attention,
            generation_failed: false,
            step,
        };

        match result.decision {
            Decision::Scripted { text, options } => {
                session.append(Role::Assistant, text.clone());
                reply.reply = text;
                reply.quick_actions = options;
            }
            Decision::NeedsGeneration {
                context,
                payload,
                acknowledgment,
            } => {
                let extra_prompt = generation_prompt(context, &payload, medical_attention);

                match self.generator.generate(session.messages(), &extra_prompt).await {
                    Ok(generated) => {
                        let text = format!("{acknowledgment}\n\n{generated}");
                        session.append(Role::Assistant, text.clone());
                        reply.reply = text;
                    }
                    Err(e) => {
                        tracing::warn!(
                            session_id = %reply.session_id,
                            kind = ?e.kind,
                            transient = e.kind.is_transient(),
                            error = %e.message,
                            "Generation failed, replying with fallback"
                        );
                        reply.reply = GENERATION_FALLBACK.to_string();
                        reply.generation_failed = true;
                    }
                }
            }
        }

        reply
    }

    /// Clear a session's conversation; readings are kept. Unknown ids are a no-op.
    pub async fn reset(&self, session_id: &str) {
        self.store.reset(session_id).await;
    }

    pub async fn stats(&self, session_id: &str) -> Option<ReadingStats> {
        self.store.stats(session_id).await
    }

    pub async fn session_count(&self) -> usize {
        self.store.len().await
    }
}
