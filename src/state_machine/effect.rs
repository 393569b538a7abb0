//! Effects (side effects as data).
//!
//! Effects describe what should happen as a result of a state transition.
//! They are pure data - the interpreter executes them against the Telegram
//! Bot API. This separation enables testing the transition logic without
//! mocking HTTP.

use serde::{Deserialize, Serialize};

use crate::state_machine::state::{ChatId, MessageRef};

/// One inline keyboard button: a label and the payload echoed back on press.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub label: String,
    pub callback_data: String,
}

impl Button {
    pub fn new(label: impl Into<String>, callback_data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            callback_data: callback_data.into(),
        }
    }
}

/// Rows of buttons attached beneath a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    /// A keyboard with a single row of buttons.
    pub fn single_row(buttons: Vec<Button>) -> Self {
        Self {
            rows: vec![buttons],
        }
    }
}

/// All effects that can be produced by state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send a message to a chat.
    SendMessage {
        chat_id: ChatId,
        text: String,
        keyboard: Option<Keyboard>,
    },

    /// Replace an existing message's text. A `None` keyboard removes any
    /// buttons the message carried; an edited message is terminal in the
    /// sense that its buttons can no longer be pressed.
    EditMessage {
        message: MessageRef,
        text: String,
        keyboard: Option<Keyboard>,
    },

    /// Send a completed application to the configured admin chat. The
    /// destination is configuration the interpreter owns; if none is
    /// configured the application is dropped with a log line.
    SendModerationRequest { text: String, keyboard: Keyboard },

    /// Acknowledge a callback query so the client stops its spinner.
    AnswerCallback {
        callback_id: String,
        text: Option<String>,
        show_alert: bool,
    },

    /// Log a message (for debugging/tracing).
    Log { level: LogLevel, message: String },
}

/// Log level for logging effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}
