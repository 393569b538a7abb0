//! Session store for per-chat conversation records.
//!
//! The store is the only shared mutable state in the process. The transition
//! for an event is computed and committed under a single write lock - the
//! transition function is pure and synchronous, so the critical section does
//! no I/O and concurrent events for the same chat cannot interleave a
//! read-modify-write. Effects are returned to the caller and executed after
//! the lock is released.

use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::debug;

use super::effect::Effect;
use super::event::Event;
use super::state::{ChatId, ConversationState, SessionRecord};
use super::transition::{transition, TransitionResult};

/// Thread-safe store for per-chat session records.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<ChatId, SessionRecord>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current record for a chat. A chat with no record reads as a
    /// fresh Idle record; this never fails.
    pub async fn get(&self, chat: ChatId) -> SessionRecord {
        let sessions = self.sessions.read().await;
        sessions.get(&chat).cloned().unwrap_or_default()
    }

    /// Overwrite the state field of a chat's record.
    pub async fn set_state(&self, chat: ChatId, state: ConversationState) {
        let mut sessions = self.sessions.write().await;
        sessions.entry(chat).or_default().state = state;
    }

    /// Insert or overwrite one answer on a chat's record, preserving the
    /// position of first write.
    pub async fn merge_answer(&self, chat: ChatId, field: &'static str, value: String) {
        let mut sessions = self.sessions.write().await;
        sessions.entry(chat).or_default().merge_answer(field, value);
    }

    /// Clear a chat back to Idle with no answers.
    pub async fn reset(&self, chat: ChatId) {
        let mut sessions = self.sessions.write().await;
        sessions.remove(&chat);
    }

    /// Process an event for a chat: run the transition under the write lock,
    /// commit the resulting record, and return the effects for the caller to
    /// execute.
    ///
    /// A record that transitions back to pristine Idle is deleted outright,
    /// so a completed (or never-started) conversation leaves nothing behind.
    pub async fn process_event(&self, chat: ChatId, event: Event) -> Vec<Effect> {
        let mut sessions = self.sessions.write().await;
        let record = sessions.get(&chat).cloned().unwrap_or_default();

        debug!(
            "processing {} for chat {} in state {:?}",
            event.log_summary(),
            chat,
            record.state
        );

        let TransitionResult { record, effects } = transition(record, event);

        if record.is_pristine() {
            sessions.remove(&chat);
        } else {
            sessions.insert(chat, record);
        }

        effects
    }

    /// Number of chats with a live (non-pristine) record.
    pub async fn len(&self) -> usize {
        let sessions = self.sessions.read().await;
        sessions.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
