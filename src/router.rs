//! Update routing.
//!
//! The router takes one normalized inbound update and selects at most one
//! state-machine event for it, in fixed priority order:
//!
//! 1. the `/start` command, in any state;
//! 2. button payloads: the welcome button's fixed literal, then moderation
//!    tokens (checked independently of any session's state, since the
//!    presser is not the subject);
//! 3. plain text, which the state machine interprets against the sender's
//!    current state;
//! 4. everything else: a silent drop. An unmatched update is a legitimate
//!    terminal outcome, never an error.

use tracing::{debug, warn};

use crate::callback::{ModerationToken, BEGIN_APPLICATION};
use crate::command::{self, BotCommand};
use crate::state_machine::event::Event;
use crate::state_machine::interpreter::{execute_effects, InterpreterContext};
use crate::state_machine::state::{Applicant, ChatId, MessageRef};
use crate::AppState;

/// One normalized inbound update, as produced by the webhook adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundUpdate {
    /// The chat whose session this update belongs to.
    pub session: ChatId,
    pub sender: Applicant,
    pub kind: UpdateKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateKind {
    Command {
        command: BotCommand,
    },
    Text {
        text: String,
    },
    ButtonActivation {
        /// Raw callback data, fed to the codec.
        data: String,
        callback_id: String,
        /// The message the button was attached to, plus its current text
        /// (needed for the append-a-status-line edit).
        message: Option<MessageRef>,
        message_text: String,
    },
}

impl InboundUpdate {
    /// Classify free-form message text: recognized commands become
    /// `Command`, everything else stays `Text`.
    pub fn from_text(session: ChatId, sender: Applicant, text: String) -> Self {
        let kind = match command::parse(&text) {
            Some(command) => UpdateKind::Command { command },
            None => UpdateKind::Text { text },
        };
        Self {
            session,
            sender,
            kind,
        }
    }
}

/// Select the state-machine event for an update. `None` means no rule
/// matched and the update is dropped.
pub fn route(update: InboundUpdate) -> Option<(ChatId, Event)> {
    let InboundUpdate {
        session,
        sender,
        kind,
    } = update;

    let event = match kind {
        UpdateKind::Command {
            command: BotCommand::Start,
        } => Event::StartCommand { applicant: sender },

        UpdateKind::ButtonActivation {
            data,
            callback_id,
            message,
            message_text,
        } => {
            if data == BEGIN_APPLICATION {
                Event::BeginApplication {
                    applicant: sender,
                    message,
                    callback_id,
                }
            } else {
                match ModerationToken::decode(&data) {
                    Ok(token) => Event::DecisionSubmitted {
                        action: token.action,
                        subject: token.subject,
                        moderator: sender.full_name,
                        message,
                        message_text,
                        callback_id,
                    },
                    Err(err) => {
                        // Recoverable: the admin message stays as it is and
                        // nobody is notified.
                        warn!("dropping malformed callback payload: {}", err);
                        return None;
                    }
                }
            }
        }

        UpdateKind::Text { text } => Event::AnswerSubmitted {
            applicant: sender,
            text,
        },
    };

    Some((session, event))
}

/// Route an update, run the transition, and execute the resulting effects.
pub async fn dispatch(state: &AppState, update: InboundUpdate) {
    let Some((session, event)) = route(update) else {
        debug!("update matched no rule; dropped");
        return;
    };

    let effects = state.sessions.process_event(session, event).await;

    let ctx = InterpreterContext {
        telegram: state.telegram.clone(),
        admin_chat: state.admin_chat,
    };
    execute_effects(&ctx, effects).await;
}
