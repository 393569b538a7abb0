//! The fixed application questionnaire.
//!
//! One static table defines the four questions, their prompts, and the state
//! that waits for each answer. The traversal order is the table order:
//! `AwaitingMinecraftNick → AwaitingDiscordNick → AwaitingSource →
//! AwaitingActivity → Idle`.

use super::state::ConversationState;

/// One questionnaire entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// Stable key the answer is stored under.
    pub name: &'static str,
    /// Label used when rendering the application for moderators.
    pub label: &'static str,
    /// Prompt sent to the applicant when this field becomes current.
    pub prompt: &'static str,
    /// The state that waits for this field's answer.
    pub state: ConversationState,
}

pub const FIELDS: [Field; 4] = [
    Field {
        name: "mc_nick",
        label: "MC nickname",
        prompt: "Great! **What is your Minecraft nickname?**",
        state: ConversationState::AwaitingMinecraftNick,
    },
    Field {
        name: "discord_nick",
        label: "Discord handle",
        prompt: "Good. **What is your Discord handle (including the tag)?**",
        state: ConversationState::AwaitingDiscordNick,
    },
    Field {
        name: "source",
        label: "Heard about us via",
        prompt: "Almost done. **Where did you find out about our server?**",
        state: ConversationState::AwaitingSource,
    },
    Field {
        name: "activity",
        label: "Plans on the server",
        prompt: "Last question: **What are you planning to do on the server?**",
        state: ConversationState::AwaitingActivity,
    },
];

/// The field the questionnaire opens with.
pub fn first() -> &'static Field {
    &FIELDS[0]
}

/// The field a given state is waiting on, if it is waiting at all.
pub fn field_for(state: ConversationState) -> Option<&'static Field> {
    FIELDS.iter().find(|f| f.state == state)
}

/// The field to prompt for after `state`'s answer was accepted.
/// `None` means the questionnaire is complete.
pub fn next_field(state: ConversationState) -> Option<&'static Field> {
    let index = FIELDS.iter().position(|f| f.state == state)?;
    FIELDS.get(index + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_awaiting_state_has_a_field() {
        for field in &FIELDS {
            assert_eq!(field_for(field.state), Some(field));
        }
        assert_eq!(field_for(ConversationState::Idle), None);
    }

    #[test]
    fn test_traversal_visits_all_fields_then_completes() {
        let mut state = first().state;
        let mut visited = vec![];
        loop {
            let field = field_for(state).unwrap();
            visited.push(field.name);
            match next_field(state) {
                Some(next) => state = next.state,
                None => break,
            }
        }
        assert_eq!(
            visited,
            vec!["mc_nick", "discord_nick", "source", "activity"]
        );
    }

    #[test]
    fn test_field_names_are_unique() {
        for (i, a) in FIELDS.iter().enumerate() {
            for b in &FIELDS[i + 1..] {
                assert_ne!(a.name, b.name);
                assert_ne!(a.state, b.state);
            }
        }
    }
}
