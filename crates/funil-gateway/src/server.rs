// SPDX-FileCopyrightText: 2026 Funil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook HTTP server built on axum.
//!
//! One endpoint serves both providers: GET for Meta's subscription
//! handshake, POST for deliveries. CORS is wide open; webhook callers are
//! authenticated (if at all) by the shared-secret header, not by origin.

use std::sync::Arc;

use axum::{Router, routing::get};
use funil_core::FunilError;
use funil_ingest::Pipeline;
use funil_storage::SqliteStorage;
use tower_http::cors::CorsLayer;

use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The ingestion pipeline over the process-wide storage handle.
    pub pipeline: Arc<Pipeline<SqliteStorage>>,
    /// Shared secret expected in `X-Webhook-Secret` (None = check disabled).
    pub webhook_secret: Option<String>,
    /// Pre-shared token for the Meta verification handshake.
    pub verify_token: Option<String>,
}

impl AppState {
    pub fn new(
        storage: Arc<SqliteStorage>,
        webhook_secret: Option<String>,
        verify_token: Option<String>,
    ) -> Self {
        Self {
            pipeline: Arc::new(Pipeline::new(storage)),
            webhook_secret,
            verify_token,
        }
    }
}

/// Build the webhook router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::get_health))
        .route(
            "/webhook",
            get(handlers::verify_webhook).post(handlers::receive_webhook),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn start_server(host: &str, port: u16, state: AppState) -> Result<(), FunilError> {
    let app = router(state);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| FunilError::Internal(format!("failed to bind webhook server to {addr}: {e}")))?;

    tracing::info!("webhook server listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| FunilError::Internal(format!("webhook server error: {e}")))?;

    Ok(())
}
