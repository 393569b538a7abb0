//! Events that trigger state transitions.
//!
//! Events represent things that happened: a command arrived, a button was
//! pressed, an answer was typed. They are inputs to the pure transition
//! function; the router builds them from normalized webhook updates.

use crate::callback::Decision;
use crate::state_machine::state::{Applicant, MessageRef, UserId};

/// All events that can trigger state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// `/start` was sent. Accepted in any state; resets the conversation.
    StartCommand { applicant: Applicant },

    /// The welcome message's "Apply" button was pressed. Accepted in any
    /// state; the questionnaire (re)starts from the first field.
    BeginApplication {
        applicant: Applicant,
        /// The welcome message, to be edited in place into the first prompt.
        /// Absent when Telegram no longer carries the message on the
        /// callback (very old buttons).
        message: Option<MessageRef>,
        callback_id: String,
    },

    /// Plain message text arrived. Only meaningful while an `Awaiting*`
    /// state is current; otherwise it matches no rule.
    AnswerSubmitted { applicant: Applicant, text: String },

    /// A decoded moderation token arrived from a decision button. Not gated
    /// by any session's state: the presser is a moderator, not the subject.
    DecisionSubmitted {
        action: Decision,
        subject: UserId,
        /// Display name of whoever pressed the button.
        moderator: String,
        /// The admin-chat message carrying the buttons, for the status edit.
        message: Option<MessageRef>,
        /// Its current text, which the status line is appended to.
        message_text: String,
        callback_id: String,
    },
}

impl Event {
    /// A summary suitable for logging. Omits free-form user text.
    pub fn log_summary(&self) -> String {
        match self {
            Event::StartCommand { applicant } => {
                format!("StartCommand {{ from: {} }}", applicant.user_id)
            }
            Event::BeginApplication { applicant, .. } => {
                format!("BeginApplication {{ from: {} }}", applicant.user_id)
            }
            Event::AnswerSubmitted { applicant, text } => {
                format!(
                    "AnswerSubmitted {{ from: {}, len: {} }}",
                    applicant.user_id,
                    text.len()
                )
            }
            Event::DecisionSubmitted {
                action, subject, ..
            } => {
                format!(
                    "DecisionSubmitted {{ action: {}, subject: {} }}",
                    action, subject
                )
            }
        }
    }
}
