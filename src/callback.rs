//! Callback-data payloads carried on inline keyboard buttons.
//!
//! Two payload families exist: the fixed `start_application` literal on the
//! welcome button, and moderation tokens of the form `approve_<id>` /
//! `reject_<id>` on the decision buttons. Telegram echoes the payload back
//! verbatim when a button is pressed, so the token is the only channel the
//! decision travels through.

use std::fmt;

use thiserror::Error;

use crate::state_machine::state::UserId;

/// Payload of the welcome message's "Apply" button.
pub const BEGIN_APPLICATION: &str = "start_application";

/// A moderator's verdict on an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    fn tag(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Decode failure for a would-be moderation token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedTokenError {
    #[error("callback data has no separator: {data:?}")]
    MissingSeparator { data: String },
    #[error("unrecognized action tag: {attempted:?}")]
    UnknownAction { attempted: String },
    #[error("subject is not a numeric user id: {subject:?}")]
    InvalidSubject { subject: String },
}

/// A decision plus the user it applies to, as carried on a decision button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModerationToken {
    pub action: Decision,
    pub subject: UserId,
}

impl ModerationToken {
    pub fn new(action: Decision, subject: UserId) -> Self {
        Self { action, subject }
    }

    /// Wire form, e.g. `approve_12345`. Subjects are numeric, so the
    /// separator cannot occur inside them.
    pub fn encode(&self) -> String {
        format!("{}_{}", self.action.tag(), self.subject)
    }

    /// Parse a wire token back into a decision. Splits on the first `_`
    /// only; unknown tags and non-numeric subjects are rejected.
    pub fn decode(data: &str) -> Result<Self, MalformedTokenError> {
        let (tag, subject) =
            data.split_once('_')
                .ok_or_else(|| MalformedTokenError::MissingSeparator {
                    data: data.to_string(),
                })?;

        let action = match tag {
            "approve" => Decision::Approve,
            "reject" => Decision::Reject,
            other => {
                return Err(MalformedTokenError::UnknownAction {
                    attempted: other.to_string(),
                })
            }
        };

        let subject: i64 =
            subject
                .parse()
                .map_err(|_| MalformedTokenError::InvalidSubject {
                    subject: subject.to_string(),
                })?;

        Ok(Self {
            action,
            subject: UserId(subject),
        })
    }
}
