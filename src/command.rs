/// Command parsing for slash commands in incoming messages.
use std::fmt;

/// A recognized bot command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    /// `/start` — greet and offer the application button.
    Start,
}

impl fmt::Display for BotCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BotCommand::Start => write!(f, "/start"),
        }
    }
}

/// Parse a message's text for a recognized command.
///
/// Only `/start` (optionally suffixed `@BotName`, as Telegram appends in
/// group chats) is a command; any other text — including other slash
/// strings — is treated as ordinary message text by the caller, so that
/// mid-questionnaire it is recorded as an answer rather than swallowed.
pub fn parse(text: &str) -> Option<BotCommand> {
    let first_word = text.trim().split_whitespace().next()?;
    let name = first_word.strip_prefix('/')?;
    let name = name.split('@').next().unwrap_or(name);

    match name {
        "start" => Some(BotCommand::Start),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_start() {
        assert_eq!(parse("/start"), Some(BotCommand::Start));
        assert_eq!(parse("  /start  "), Some(BotCommand::Start));
        assert_eq!(parse("/start@GatekeeperBot"), Some(BotCommand::Start));
        assert_eq!(parse("/start with trailing words"), Some(BotCommand::Start));
    }

    #[test]
    fn test_other_slash_strings_are_not_commands() {
        assert_eq!(parse("/help"), None);
        assert_eq!(parse("/started"), None);
        assert_eq!(parse("start"), None);
        assert_eq!(parse(""), None);
    }
}
