//! Pure state transition function.
//!
//! The transition function is the core of the conversation engine. It takes
//! the current session record and an event, and returns the new record and a
//! list of effects. This function has NO side effects - it is pure and
//! deterministic.
//!
//! Rule order matters and mirrors the router's dispatch: `/start` and
//! moderation decisions are handled here for every state, before the
//! per-state handlers:
//! - `idle`: Idle state transitions
//! - `awaiting`: the four `Awaiting*` questionnaire states

mod awaiting;
mod idle;

use crate::callback::{Decision, ModerationToken, BEGIN_APPLICATION};
use crate::state_machine::effect::{Button, Effect, Keyboard, LogLevel};
use crate::state_machine::event::Event;
use crate::state_machine::questionnaire;
use crate::state_machine::state::{
    Applicant, ChatId, ConversationState, MessageRef, SessionRecord, UserId,
};

const WELCOME_TEXT: &str =
    "Welcome to the server application system! Press the button below to apply.";
const APPLY_BUTTON_LABEL: &str = "\u{1F4DD} Apply";

/// Result of a state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// The session record after the transition.
    pub record: SessionRecord,
    /// Effects to execute.
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(record: SessionRecord, effects: Vec<Effect>) -> Self {
        Self { record, effects }
    }

    pub fn no_change(record: SessionRecord) -> Self {
        Self {
            record,
            effects: vec![],
        }
    }
}

/// Pure state transition function.
///
/// Given the current session record and an event, returns the new record and
/// effects to execute. All effects are returned as data.
pub fn transition(record: SessionRecord, event: Event) -> TransitionResult {
    match event {
        // /start resets the conversation from any state, discarding any
        // partially collected answers.
        Event::StartCommand { applicant } => start_over(&applicant),

        // Decisions are issued by moderators, so they are never gated by the
        // presser's own conversation state.
        Event::DecisionSubmitted {
            action,
            subject,
            moderator,
            message,
            message_text,
            callback_id,
        } => decide(
            record,
            action,
            subject,
            &moderator,
            message,
            &message_text,
            callback_id,
        ),

        event => match record.state {
            ConversationState::Idle => idle::handle(record, event),
            _ => awaiting::handle(record, event),
        },
    }
}

/// Reset to Idle and greet with the single "Apply" button.
fn start_over(applicant: &Applicant) -> TransitionResult {
    TransitionResult::new(
        SessionRecord::default(),
        vec![Effect::SendMessage {
            chat_id: applicant.chat_id,
            text: WELCOME_TEXT.to_string(),
            keyboard: Some(Keyboard::single_row(vec![Button::new(
                APPLY_BUTTON_LABEL,
                BEGIN_APPLICATION,
            )])),
        }],
    )
}

/// Enter the first questionnaire state, replacing the welcome message in
/// place with the first prompt. Shared by the Idle and Awaiting handlers:
/// the button works from any state and always restarts from scratch.
pub(crate) fn begin_questionnaire(
    applicant: &Applicant,
    message: Option<MessageRef>,
    callback_id: String,
) -> TransitionResult {
    let field = questionnaire::first();

    let prompt = match message {
        Some(message) => Effect::EditMessage {
            message,
            text: field.prompt.to_string(),
            keyboard: None,
        },
        // The callback no longer carries its source message; fall back to a
        // fresh message rather than losing the prompt.
        None => Effect::SendMessage {
            chat_id: applicant.chat_id,
            text: field.prompt.to_string(),
            keyboard: None,
        },
    };

    TransitionResult::new(
        SessionRecord::at(field.state),
        vec![
            prompt,
            Effect::AnswerCallback {
                callback_id,
                text: None,
                show_alert: false,
            },
        ],
    )
}

/// Apply a moderation decision: notify the subject, stamp the admin message
/// with the outcome (dropping its buttons), and acknowledge the press.
#[allow(clippy::too_many_arguments)]
fn decide(
    record: SessionRecord,
    action: Decision,
    subject: UserId,
    moderator: &str,
    message: Option<MessageRef>,
    message_text: &str,
    callback_id: String,
) -> TransitionResult {
    let (notice, status, ack) = match action {
        Decision::Approve => (
            "\u{1F973} **Congratulations! Your application has been approved!** \
             The server menu is now available to you. /start",
            "\u{2705} Approved",
            "Application approved.",
        ),
        Decision::Reject => (
            "\u{1F614} **Unfortunately, your application has been rejected.** \
             You are welcome to try again later.",
            "\u{274C} Rejected",
            "Application rejected.",
        ),
    };

    let mut effects = vec![Effect::SendMessage {
        // For direct chats the chat id equals the user id, which is what the
        // decision token carries.
        chat_id: ChatId(subject.0),
        text: notice.to_string(),
        keyboard: None,
    }];

    match message {
        Some(message) => effects.push(Effect::EditMessage {
            message,
            text: format!(
                "{}\n\n**STATUS:** {} (moderator: {})",
                message_text, status, moderator
            ),
            keyboard: None,
        }),
        None => effects.push(Effect::Log {
            level: LogLevel::Warn,
            message: format!(
                "decision {} for {} arrived without its source message; admin message left unedited",
                action, subject
            ),
        }),
    }

    effects.push(Effect::AnswerCallback {
        callback_id,
        text: Some(ack.to_string()),
        show_alert: true,
    });

    TransitionResult::new(record, effects)
}

/// Decision buttons for a fresh application, encoding the applicant's id.
pub(crate) fn decision_keyboard(subject: UserId) -> Keyboard {
    Keyboard::single_row(vec![
        Button::new(
            "\u{2705} APPROVE",
            ModerationToken::new(Decision::Approve, subject).encode(),
        ),
        Button::new(
            "\u{274C} REJECT",
            ModerationToken::new(Decision::Reject, subject).encode(),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_machine::state::MessageId;

    fn applicant() -> Applicant {
        Applicant {
            user_id: UserId(555),
            chat_id: ChatId(555),
            username: Some("steve".to_string()),
            full_name: "Steve Miner".to_string(),
        }
    }

    fn admin_message() -> MessageRef {
        MessageRef {
            chat_id: ChatId(-100),
            message_id: MessageId(42),
        }
    }

    #[test]
    fn test_start_resets_any_state_and_sends_welcome() {
        let mut record = SessionRecord::at(ConversationState::AwaitingSource);
        record.merge_answer("mc_nick", "Steve".to_string());

        let result = transition(
            record,
            Event::StartCommand {
                applicant: applicant(),
            },
        );

        assert!(result.record.is_pristine());
        assert_eq!(result.effects.len(), 1);
        match &result.effects[0] {
            Effect::SendMessage {
                chat_id, keyboard, ..
            } => {
                assert_eq!(*chat_id, ChatId(555));
                let keyboard = keyboard.as_ref().unwrap();
                assert_eq!(keyboard.rows[0][0].callback_data, BEGIN_APPLICATION);
            }
            other => panic!("expected SendMessage, got {:?}", other),
        }
    }

    #[test]
    fn test_begin_edits_welcome_into_first_prompt() {
        let result = transition(
            SessionRecord::default(),
            Event::BeginApplication {
                applicant: applicant(),
                message: Some(MessageRef {
                    chat_id: ChatId(555),
                    message_id: MessageId(7),
                }),
                callback_id: "cb1".to_string(),
            },
        );

        assert_eq!(
            result.record.state,
            ConversationState::AwaitingMinecraftNick
        );
        assert!(matches!(
            &result.effects[0],
            Effect::EditMessage { text, keyboard: None, .. }
                if text == questionnaire::first().prompt
        ));
        assert!(matches!(
            &result.effects[1],
            Effect::AnswerCallback {
                show_alert: false,
                ..
            }
        ));
    }

    #[test]
    fn test_begin_mid_questionnaire_discards_answers() {
        let mut record = SessionRecord::at(ConversationState::AwaitingActivity);
        record.merge_answer("mc_nick", "Steve".to_string());

        let result = transition(
            record,
            Event::BeginApplication {
                applicant: applicant(),
                message: None,
                callback_id: "cb2".to_string(),
            },
        );

        assert_eq!(
            result.record.state,
            ConversationState::AwaitingMinecraftNick
        );
        assert!(result.record.answers.is_empty());
        // Without a source message the prompt goes out as a fresh send.
        assert!(matches!(&result.effects[0], Effect::SendMessage { .. }));
    }

    #[test]
    fn test_approve_notifies_subject_and_stamps_admin_message() {
        let result = transition(
            SessionRecord::default(),
            Event::DecisionSubmitted {
                action: Decision::Approve,
                subject: UserId(555),
                moderator: "Mod Eration".to_string(),
                message: Some(admin_message()),
                message_text: "application body".to_string(),
                callback_id: "cb3".to_string(),
            },
        );

        assert!(result.record.is_pristine());
        assert_eq!(result.effects.len(), 3);

        assert!(matches!(
            &result.effects[0],
            Effect::SendMessage { chat_id, .. } if *chat_id == ChatId(555)
        ));
        match &result.effects[1] {
            Effect::EditMessage {
                message,
                text,
                keyboard,
            } => {
                assert_eq!(*message, admin_message());
                assert!(text.starts_with("application body"));
                assert!(text.contains("Approved"));
                assert!(text.contains("Mod Eration"));
                assert!(keyboard.is_none());
            }
            other => panic!("expected EditMessage, got {:?}", other),
        }
        assert!(matches!(
            &result.effects[2],
            Effect::AnswerCallback {
                show_alert: true,
                ..
            }
        ));
    }

    #[test]
    fn test_reject_notice_differs_from_approve() {
        let reject = transition(
            SessionRecord::default(),
            Event::DecisionSubmitted {
                action: Decision::Reject,
                subject: UserId(555),
                moderator: "Mod".to_string(),
                message: Some(admin_message()),
                message_text: "body".to_string(),
                callback_id: "cb4".to_string(),
            },
        );

        match &reject.effects[0] {
            Effect::SendMessage { text, .. } => assert!(text.contains("rejected")),
            other => panic!("expected SendMessage, got {:?}", other),
        }
        match &reject.effects[1] {
            Effect::EditMessage { text, .. } => assert!(text.contains("Rejected")),
            other => panic!("expected EditMessage, got {:?}", other),
        }
    }

    #[test]
    fn test_decision_in_awaiting_state_leaves_record_alone() {
        // A moderator may themselves be mid-questionnaire; their session
        // must not be disturbed by pressing a decision button.
        let mut record = SessionRecord::at(ConversationState::AwaitingDiscordNick);
        record.merge_answer("mc_nick", "Modcraft".to_string());

        let result = transition(
            record.clone(),
            Event::DecisionSubmitted {
                action: Decision::Approve,
                subject: UserId(777),
                moderator: "Mod".to_string(),
                message: Some(admin_message()),
                message_text: "body".to_string(),
                callback_id: "cb5".to_string(),
            },
        );

        assert_eq!(result.record, record);
    }

    #[test]
    fn test_decision_without_source_message_logs_instead_of_editing() {
        let result = transition(
            SessionRecord::default(),
            Event::DecisionSubmitted {
                action: Decision::Approve,
                subject: UserId(555),
                moderator: "Mod".to_string(),
                message: None,
                message_text: String::new(),
                callback_id: "cb6".to_string(),
            },
        );

        assert!(result
            .effects
            .iter()
            .all(|e| !matches!(e, Effect::EditMessage { .. })));
        assert!(result.effects.iter().any(|e| matches!(
            e,
            Effect::Log {
                level: LogLevel::Warn,
                ..
            }
        )));
    }

    #[test]
    fn test_decision_keyboard_round_trips_through_codec() {
        let keyboard = decision_keyboard(UserId(555));
        let buttons = &keyboard.rows[0];
        assert_eq!(
            ModerationToken::decode(&buttons[0].callback_data),
            Ok(ModerationToken::new(Decision::Approve, UserId(555)))
        );
        assert_eq!(
            ModerationToken::decode(&buttons[1].callback_data),
            Ok(ModerationToken::new(Decision::Reject, UserId(555)))
        );
    }
}
