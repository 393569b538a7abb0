//! Transitions for the four `Awaiting*` questionnaire states.

use super::{begin_questionnaire, decision_keyboard, TransitionResult};
use crate::state_machine::effect::Effect;
use crate::state_machine::event::Event;
use crate::state_machine::questionnaire;
use crate::state_machine::state::{Applicant, SessionRecord};

const CONFIRMATION_TEXT: &str = "Thank you! Your application has been submitted for review. \
     We will let you know the outcome.";

/// Handle transitions while an answer is being awaited.
///
/// Any plain text is the answer to the current field, verbatim: the
/// questionnaire applies no validation. The answer either advances the
/// conversation to the next prompt or, on the last field, completes the
/// application.
pub fn handle(mut record: SessionRecord, event: Event) -> TransitionResult {
    match event {
        Event::AnswerSubmitted { applicant, text } => {
            let Some(field) = questionnaire::field_for(record.state) else {
                return TransitionResult::no_change(record);
            };
            record.merge_answer(field.name, text);

            match questionnaire::next_field(record.state) {
                Some(next) => {
                    record.state = next.state;
                    TransitionResult::new(
                        record,
                        vec![Effect::SendMessage {
                            chat_id: applicant.chat_id,
                            text: next.prompt.to_string(),
                            keyboard: None,
                        }],
                    )
                }
                None => complete(record, &applicant),
            }
        }

        // Pressing the welcome button mid-questionnaire starts over.
        Event::BeginApplication {
            applicant,
            message,
            callback_id,
        } => begin_questionnaire(&applicant, message, callback_id),

        _ => TransitionResult::no_change(record),
    }
}

/// The last field was just collected: the record is consumed immediately
/// (before any delivery is attempted, so a send failure cannot resurrect the
/// questionnaire), the applicant gets a confirmation, and the application
/// goes to the moderators with decision buttons.
fn complete(record: SessionRecord, applicant: &Applicant) -> TransitionResult {
    let effects = vec![
        Effect::SendMessage {
            chat_id: applicant.chat_id,
            text: CONFIRMATION_TEXT.to_string(),
            keyboard: None,
        },
        Effect::SendModerationRequest {
            text: render_application(applicant, &record),
            keyboard: decision_keyboard(applicant.user_id),
        },
    ];

    TransitionResult::new(SessionRecord::default(), effects)
}

/// Render the completed application for the admin chat.
fn render_application(applicant: &Applicant, record: &SessionRecord) -> String {
    let mut text = format!(
        "\u{1F525} **NEW SERVER APPLICATION** \u{1F525}\n\n\
         **From:** {}\n\
         **Telegram ID:** `{}`\n",
        applicant.handle(),
        applicant.user_id,
    );

    for field in &questionnaire::FIELDS {
        let value = record.answer(field.name).unwrap_or("-");
        text.push_str(&format!("\n**{}:** {}", field.label, value));
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callback::{Decision, ModerationToken};
    use crate::state_machine::state::{ChatId, ConversationState, UserId};
    use crate::state_machine::transition::transition;

    fn applicant() -> Applicant {
        Applicant {
            user_id: UserId(555),
            chat_id: ChatId(555),
            username: Some("steve".to_string()),
            full_name: "Steve Miner".to_string(),
        }
    }

    fn answer(text: &str) -> Event {
        Event::AnswerSubmitted {
            applicant: applicant(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_answer_advances_to_next_prompt() {
        let record = SessionRecord::at(ConversationState::AwaitingMinecraftNick);

        let result = handle(record, answer("Steve"));

        assert_eq!(result.record.state, ConversationState::AwaitingDiscordNick);
        assert_eq!(result.record.answer("mc_nick"), Some("Steve"));
        assert_eq!(result.effects.len(), 1);
        match &result.effects[0] {
            Effect::SendMessage { text, .. } => {
                assert!(text.contains("Discord"));
            }
            other => panic!("expected SendMessage, got {:?}", other),
        }
    }

    /// Walking the whole questionnaire ends Idle with all four answers in a
    /// single moderation request.
    #[test]
    fn test_four_answers_complete_the_application() {
        let answers = ["Steve", "steve#0001", "friend", "building"];

        let mut record = SessionRecord::at(ConversationState::AwaitingMinecraftNick);
        let mut final_effects = vec![];
        for text in answers {
            let result = transition(record, answer(text));
            record = result.record;
            final_effects = result.effects;
        }

        assert!(record.is_pristine());
        assert_eq!(final_effects.len(), 2);

        match &final_effects[0] {
            Effect::SendMessage { chat_id, text, .. } => {
                assert_eq!(*chat_id, ChatId(555));
                assert!(text.contains("submitted for review"));
            }
            other => panic!("expected SendMessage, got {:?}", other),
        }

        match &final_effects[1] {
            Effect::SendModerationRequest { text, keyboard } => {
                for value in answers {
                    assert!(text.contains(value), "missing {:?} in {:?}", value, text);
                }
                assert!(text.contains("@steve"));
                assert!(text.contains("555"));

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
            other => panic!("expected SendModerationRequest, got {:?}", other),
        }
    }

    #[test]
    fn test_answers_are_recorded_verbatim() {
        let record = SessionRecord::at(ConversationState::AwaitingMinecraftNick);
        let weird = "  x X_x ❤ /help  ";

        let result = handle(record, answer(weird));

        assert_eq!(result.record.answer("mc_nick"), Some(weird));
    }

    #[test]
    fn test_completion_consumes_record_even_before_delivery() {
        let mut record = SessionRecord::at(ConversationState::AwaitingActivity);
        record.merge_answer("mc_nick", "Steve".to_string());
        record.merge_answer("discord_nick", "steve#0001".to_string());
        record.merge_answer("source", "friend".to_string());

        let result = handle(record, answer("building"));

        // The new record is pristine regardless of what happens to the
        // emitted effects; delivery failures never roll this back.
        assert!(result.record.is_pristine());
    }
}
