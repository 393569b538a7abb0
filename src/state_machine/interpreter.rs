//! Effect interpreter that executes effects against the Telegram Bot API.
//!
//! The interpreter is the boundary between the pure state machine and the
//! impure world of I/O. Delivery failures are logged and swallowed: by the
//! time an effect exists the state transition has already been committed,
//! so a failed send must never propagate back into the engine.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::effect::{Effect, Keyboard, LogLevel};
use super::state::ChatId;
use crate::telegram::TelegramClient;

/// Context needed by the interpreter to execute effects.
pub struct InterpreterContext {
    pub telegram: Arc<TelegramClient>,
    /// The fixed destination for completed applications. `None` when the
    /// configured value was unusable; applications are then dropped with a
    /// log line instead of being forwarded.
    pub admin_chat: Option<ChatId>,
}

/// Execute a list of effects in order. A failed effect does not stop the
/// remaining ones.
pub async fn execute_effects(ctx: &InterpreterContext, effects: Vec<Effect>) {
    for effect in effects {
        if let Err(err) = execute_effect(ctx, effect).await {
            error!("outbound delivery failed: {err:#}");
        }
    }
}

async fn execute_effect(ctx: &InterpreterContext, effect: Effect) -> anyhow::Result<()> {
    match effect {
        Effect::SendMessage {
            chat_id,
            text,
            keyboard,
        } => {
            ctx.telegram
                .send_message(chat_id, &text, keyboard.as_ref())
                .await?;
        }

        Effect::EditMessage {
            message,
            text,
            keyboard,
        } => {
            ctx.telegram
                .edit_message_text(&message, &text, keyboard.as_ref())
                .await?;
        }

        Effect::SendModerationRequest { text, keyboard } => {
            send_moderation_request(ctx, &text, &keyboard).await?;
        }

        Effect::AnswerCallback {
            callback_id,
            text,
            show_alert,
        } => {
            ctx.telegram
                .answer_callback_query(&callback_id, text.as_deref(), show_alert)
                .await?;
        }

        Effect::Log { level, message } => match level {
            LogLevel::Debug => debug!("{}", message),
            LogLevel::Info => info!("{}", message),
            LogLevel::Warn => warn!("{}", message),
            LogLevel::Error => error!("{}", message),
        },
    }

    Ok(())
}

async fn send_moderation_request(
    ctx: &InterpreterContext,
    text: &str,
    keyboard: &Keyboard,
) -> anyhow::Result<()> {
    let Some(admin_chat) = ctx.admin_chat else {
        warn!("no admin destination configured; dropping completed application");
        return Ok(());
    };

    ctx.telegram
        .send_message(admin_chat, text, Some(keyboard))
        .await?;
    info!("forwarded completed application to admin chat {}", admin_chat);
    Ok(())
}
