// SPDX-FileCopyrightText: 2026 Funil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `funil serve` command implementation.
//!
//! Opens the SQLite database, builds the ingestion pipeline, and serves
//! the webhook endpoint until the process is stopped.

use std::sync::Arc;

use funil_config::FunilConfig;
use funil_core::FunilError;
use funil_gateway::{AppState, start_server};
use funil_storage::SqliteStorage;
use tracing::info;

pub async fn run(config: FunilConfig) -> Result<(), FunilError> {
    init_tracing(&config.service.log_level);

    info!(
        service = %config.service.name,
        database = %config.storage.database_path,
        "starting funil"
    );
    if config.webhook.secret.is_none() {
        tracing::warn!("no webhook secret configured; POST /webhook accepts any caller");
    }

    let storage = Arc::new(SqliteStorage::open(&config.storage.database_path).await?);
    let state = AppState::new(
        storage,
        config.webhook.secret.clone(),
        config.webhook.verify_token.clone(),
    );

    start_server(&config.server.host, config.server.port, state).await
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("funil={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
