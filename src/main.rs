use anyhow::Result;
use axum::{http::StatusCode, response::Json, routing::get, Router};
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{error, info, Level};

use gatekeeper::config::Config;
use gatekeeper::state_machine::SessionStore;
use gatekeeper::telegram::TelegramClient;
use gatekeeper::webhook::webhook_router;
use gatekeeper::AppState;

async fn health_check() -> Result<Json<serde_json::Value>, StatusCode> {
    Ok(Json(json!({
        "status": "healthy",
        "service": "gatekeeper"
    })))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("failed to listen for ctrl-c: {}", err);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => error!("failed to listen for SIGTERM: {}", err),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    info!("Starting application intake bot");

    // Configuration problems abort startup with a log line, not a panic:
    // the hosting platform restarts us once the environment is fixed.
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("configuration error: {:#}", err);
            return Ok(());
        }
    };

    let telegram = Arc::new(TelegramClient::new(&config.bot_token));

    let endpoint = config.webhook_endpoint();
    if let Err(err) = telegram
        .set_webhook(&endpoint, config.webhook_secret.as_deref())
        .await
    {
        error!("failed to register webhook at {}: {:#}", endpoint, err);
        return Ok(());
    }
    info!("Webhook registered: {}", endpoint);

    let app_state = Arc::new(AppState {
        telegram: telegram.clone(),
        sessions: SessionStore::new(),
        admin_chat: config.admin_chat,
        webhook_secret: config.webhook_secret.clone(),
    });

    let app = Router::new()
        .route("/health", get(health_check))
        .merge(webhook_router(app_state))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));

    let listener = TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    info!("Server listening on port {}", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Best effort: stop Telegram from delivering into a dead endpoint.
    if let Err(err) = telegram.delete_webhook().await {
        error!("failed to deregister webhook: {:#}", err);
    }

    Ok(())
}
