//! State types for the application conversation.
//!
//! Each applicant chat owns exactly one [`SessionRecord`]: where they are in
//! the questionnaire and which answers have been collected so far. A missing
//! record reads as the explicit [`ConversationState::Idle`] variant, so every
//! code path handles "no conversation" the same way as "conversation at rest".

use std::fmt;

/// Newtype for a Telegram chat identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ChatId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Newtype for a Telegram user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Newtype for a Telegram message identifier within a chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId(pub i64);

impl From<i64> for MessageId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Reference to a concrete message, as needed for in-place edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// Identity of the person the bot is talking to.
///
/// Carried on inbound events so the transition function can address replies
/// and render the applicant in the moderation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applicant {
    pub user_id: UserId,
    pub chat_id: ChatId,
    pub username: Option<String>,
    pub full_name: String,
}

impl Applicant {
    /// `@username` when one is set, the numeric id otherwise.
    pub fn handle(&self) -> String {
        match &self.username {
            Some(name) => format!("@{}", name),
            None => self.user_id.to_string(),
        }
    }
}

/// Where an applicant currently is in the questionnaire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConversationState {
    /// No application in progress.
    Idle,
    AwaitingMinecraftNick,
    AwaitingDiscordNick,
    AwaitingSource,
    AwaitingActivity,
}

impl ConversationState {
    /// Returns true while the bot is waiting for a questionnaire answer.
    pub fn is_awaiting(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::Idle
    }
}

/// One collected answer. Field names come from [`crate::state_machine::questionnaire`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub field: &'static str,
    pub value: String,
}

/// Per-chat conversation record: current state plus collected answers.
///
/// Answer order is first-write order, which for the normal flow equals
/// questionnaire order and is what the moderation summary renders.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionRecord {
    pub state: ConversationState,
    pub answers: Vec<Answer>,
}

impl SessionRecord {
    /// A fresh record positioned at the given state, with no answers.
    pub fn at(state: ConversationState) -> Self {
        Self {
            state,
            answers: Vec::new(),
        }
    }

    /// Insert or overwrite one answer, preserving the position of first write.
    pub fn merge_answer(&mut self, field: &'static str, value: String) {
        match self.answers.iter_mut().find(|a| a.field == field) {
            Some(existing) => existing.value = value,
            None => self.answers.push(Answer { field, value }),
        }
    }

    /// Look up a collected answer by field name.
    pub fn answer(&self, field: &str) -> Option<&str> {
        self.answers
            .iter()
            .find(|a| a.field == field)
            .map(|a| a.value.as_str())
    }

    /// True for a record indistinguishable from "never interacted".
    pub fn is_pristine(&self) -> bool {
        self.state == ConversationState::Idle && self.answers.is_empty()
    }
}
