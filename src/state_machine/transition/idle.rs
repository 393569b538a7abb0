//! Idle state transitions.

use super::{begin_questionnaire, TransitionResult};
use crate::state_machine::event::Event;
use crate::state_machine::state::SessionRecord;

/// Handle transitions from the Idle state.
///
/// Idle is the rest state: nothing is being collected. The only event that
/// moves the conversation forward is the welcome button; stray text is
/// dropped without a reply.
pub fn handle(record: SessionRecord, event: Event) -> TransitionResult {
    match event {
        Event::BeginApplication {
            applicant,
            message,
            callback_id,
        } => begin_questionnaire(&applicant, message, callback_id),

        // Text while no questionnaire is active matches no rule.
        Event::AnswerSubmitted { .. } => TransitionResult::no_change(record),

        // StartCommand and DecisionSubmitted are handled before per-state
        // dispatch; nothing else reaches this handler.
        _ => TransitionResult::no_change(record),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_machine::state::{Applicant, ChatId, ConversationState, UserId};

    fn applicant() -> Applicant {
        Applicant {
            user_id: UserId(1),
            chat_id: ChatId(1),
            username: None,
            full_name: "Test".to_string(),
        }
    }

    #[test]
    fn test_text_while_idle_is_silently_dropped() {
        let result = handle(
            SessionRecord::default(),
            Event::AnswerSubmitted {
                applicant: applicant(),
                text: "unsolicited".to_string(),
            },
        );

        assert!(result.record.is_pristine());
        assert!(result.effects.is_empty());
    }

    #[test]
    fn test_begin_moves_to_first_question() {
        let result = handle(
            SessionRecord::default(),
            Event::BeginApplication {
                applicant: applicant(),
                message: None,
                callback_id: "cb".to_string(),
            },
        );

        assert_eq!(
            result.record.state,
            ConversationState::AwaitingMinecraftNick
        );
    }
}
