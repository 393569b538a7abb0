//! Webhook transport: receives Telegram updates and feeds them to the router.
//!
//! The ingress contract is acknowledgement-on-receipt: once a request is
//! authenticated, the handler always answers 200, whatever happens during
//! processing. Telegram retries undelivered updates, and a retry of an
//! already-processed update is worse than a swallowed processing error.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::post,
    Router,
};
use std::sync::Arc;
use tracing::{info_span, warn, Instrument};
use uuid::Uuid;

use crate::router::{dispatch, InboundUpdate, UpdateKind};
use crate::state_machine::state::{Applicant, ChatId, UserId};
use crate::telegram;
use crate::AppState;

const SECRET_TOKEN_HEADER: &str = "x-telegram-bot-api-secret-token";

/// Routes for the webhook endpoint, mounted at the root path (which is
/// where the webhook is registered with Telegram).
pub fn webhook_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", post(telegram_webhook_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            verify_secret_token,
        ))
        .with_state(state)
}

/// Reject requests that do not carry the configured secret token. With no
/// secret configured every request is accepted, as in the upstream design.
async fn verify_secret_token(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if let Some(expected) = &state.webhook_secret {
        let provided = request
            .headers()
            .get(SECRET_TOKEN_HEADER)
            .and_then(|h| h.to_str().ok());

        if provided != Some(expected.as_str()) {
            warn!("webhook request with missing or wrong secret token");
            return Err(StatusCode::UNAUTHORIZED);
        }
    }

    Ok(next.run(request).await)
}

async fn telegram_webhook_handler(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> StatusCode {
    let (_parts, body) = request.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!("failed to read webhook body: {}", err);
            return StatusCode::OK;
        }
    };

    let update: telegram::Update = match serde_json::from_slice(&bytes) {
        Ok(update) => update,
        Err(err) => {
            warn!("undecodable webhook payload: {}", err);
            return StatusCode::OK;
        }
    };

    let update_id = update.update_id;
    let Some(update) = normalize(update) else {
        // No text, no sender, no callback data: nothing the router could
        // ever match.
        return StatusCode::OK;
    };

    // Answer Telegram immediately; processing (including outbound sends)
    // happens on its own task.
    let correlation_id = Uuid::new_v4();
    let span = info_span!("update", %correlation_id, update_id);
    tokio::spawn(
        async move {
            dispatch(&state, update).await;
        }
        .instrument(span),
    );

    StatusCode::OK
}

/// Convert a raw Telegram update into the router's normalized shape.
/// `None` means the update carries nothing routable and is dropped here.
pub fn normalize(update: telegram::Update) -> Option<InboundUpdate> {
    if let Some(message) = update.message {
        let from = message.from?;
        let text = message.text?;
        let session = ChatId(message.chat.id);
        let sender = applicant_from(&from, session);
        return Some(InboundUpdate::from_text(session, sender, text));
    }

    if let Some(callback) = update.callback_query {
        let data = callback.data?;
        let session = callback
            .message
            .as_ref()
            .map(|m| ChatId(m.chat.id))
            .unwrap_or(ChatId(callback.from.id));
        let sender = applicant_from(&callback.from, session);

        let (message, message_text) = match &callback.message {
            Some(m) => (
                Some(m.message_ref()),
                m.text.clone().unwrap_or_default(),
            ),
            None => (None, String::new()),
        };

        return Some(InboundUpdate {
            session,
            sender,
            kind: UpdateKind::ButtonActivation {
                data,
                callback_id: callback.id,
                message,
                message_text,
            },
        });
    }

    None
}

fn applicant_from(user: &telegram::User, chat_id: ChatId) -> Applicant {
    Applicant {
        user_id: UserId(user.id),
        chat_id,
        username: user.username.clone(),
        full_name: user.full_name(),
    }
}
