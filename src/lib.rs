pub mod callback;
pub mod command;
pub mod config;
pub mod router;
pub mod state_machine;
pub mod telegram;
pub mod webhook;

use std::sync::Arc;

use state_machine::state::ChatId;
use state_machine::SessionStore;
use telegram::TelegramClient;

/// Shared application state handed to every request handler.
pub struct AppState {
    pub telegram: Arc<TelegramClient>,
    pub sessions: SessionStore,
    /// Destination for completed applications, when one is configured.
    pub admin_chat: Option<ChatId>,
    /// Expected value of the webhook secret-token header, when configured.
    pub webhook_secret: Option<String>,
}
