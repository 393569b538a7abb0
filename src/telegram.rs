use anyhow::{bail, Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::state_machine::effect::Keyboard;
use crate::state_machine::state::{ChatId, MessageRef};

/// Outbound client for the Telegram Bot API.
///
/// Authentication is the bot token embedded in the request path; there are
/// no per-request credentials.
pub struct TelegramClient {
    client: Client,
    base_url: String,
}

// =============================================================================
// Inbound wire types (webhook payloads)
// =============================================================================

/// One inbound update as Telegram delivers it to the webhook.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
}

impl Message {
    pub fn message_ref(&self) -> MessageRef {
        MessageRef {
            chat_id: ChatId(self.chat.id),
            message_id: crate::state_machine::state::MessageId(self.message_id),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

impl User {
    pub fn full_name(&self) -> String {
        match &self.last_name {
            Some(last) => format!("{} {}", self.first_name, last),
            None => self.first_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    /// The message the pressed button was attached to. Telegram omits it for
    /// sufficiently old messages.
    pub message: Option<Message>,
    pub data: Option<String>,
}

// =============================================================================
// Outbound wire types
// =============================================================================

#[derive(Debug, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Debug, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub callback_data: String,
}

impl From<&Keyboard> for InlineKeyboardMarkup {
    fn from(keyboard: &Keyboard) -> Self {
        Self {
            inline_keyboard: keyboard
                .rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|b| InlineKeyboardButton {
                            text: b.label.clone(),
                            callback_data: b.callback_data.clone(),
                        })
                        .collect()
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    parse_mode: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<InlineKeyboardMarkup>,
}

#[derive(Debug, Serialize)]
struct EditMessageTextRequest<'a> {
    chat_id: i64,
    message_id: i64,
    text: &'a str,
    parse_mode: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<InlineKeyboardMarkup>,
}

#[derive(Debug, Serialize)]
struct AnswerCallbackQueryRequest<'a> {
    callback_query_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    show_alert: bool,
}

#[derive(Debug, Serialize)]
struct SetWebhookRequest<'a> {
    url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    secret_token: Option<&'a str>,
}

/// Envelope every Bot API response arrives in.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    description: Option<String>,
}

impl TelegramClient {
    pub fn new(bot_token: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: format!("https://api.telegram.org/bot{}", bot_token),
        }
    }

    /// Send a text message, optionally with an inline keyboard.
    pub async fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<()> {
        self.call(
            "sendMessage",
            &SendMessageRequest {
                chat_id: chat_id.0,
                text,
                parse_mode: "Markdown",
                reply_markup: keyboard.map(InlineKeyboardMarkup::from),
            },
        )
        .await
    }

    /// Replace the text (and keyboard) of an existing message. Passing no
    /// keyboard strips any buttons the message carried.
    pub async fn edit_message_text(
        &self,
        message: &MessageRef,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<()> {
        self.call(
            "editMessageText",
            &EditMessageTextRequest {
                chat_id: message.chat_id.0,
                message_id: message.message_id.0,
                text,
                parse_mode: "Markdown",
                reply_markup: keyboard.map(InlineKeyboardMarkup::from),
            },
        )
        .await
    }

    /// Acknowledge a callback query, optionally with a popup.
    pub async fn answer_callback_query(
        &self,
        callback_query_id: &str,
        text: Option<&str>,
        show_alert: bool,
    ) -> Result<()> {
        self.call(
            "answerCallbackQuery",
            &AnswerCallbackQueryRequest {
                callback_query_id,
                text,
                show_alert,
            },
        )
        .await
    }

    /// Register the webhook endpoint with Telegram.
    pub async fn set_webhook(&self, url: &str, secret_token: Option<&str>) -> Result<()> {
        self.call("setWebhook", &SetWebhookRequest { url, secret_token })
            .await
    }

    /// Deregister the webhook (used during shutdown).
    pub async fn delete_webhook(&self) -> Result<()> {
        self.call("deleteWebhook", &serde_json::json!({})).await
    }

    async fn call<P: Serialize>(&self, method: &str, payload: &P) -> Result<()> {
        let response = self
            .client
            .post(format!("{}/{}", self.base_url, method))
            .json(payload)
            .send()
            .await
            .with_context(|| format!("request to {} failed", method))?;

        let status = response.status();
        let body: ApiResponse = response
            .json()
            .await
            .with_context(|| format!("{} returned an unreadable body (status {})", method, status))?;

        if !body.ok {
            bail!(
                "{} rejected by Telegram (status {}): {}",
                method,
                status,
                body.description.unwrap_or_else(|| "no description".to_string())
            );
        }

        debug!("{} delivered", method);
        Ok(())
    }
}
