// SPDX-FileCopyrightText: 2026 Funil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `funil send` command implementation.
//!
//! Operator-facing outbound send through the same dispatcher the API uses.

use std::sync::Arc;

use funil_config::FunilConfig;
use funil_core::FunilError;
use funil_dispatch::Dispatcher;
use funil_storage::SqliteStorage;

pub async fn run(
    config: FunilConfig,
    organization_id: &str,
    to: &str,
    text: &str,
) -> Result<(), FunilError> {
    let storage = Arc::new(SqliteStorage::open(&config.storage.database_path).await?);
    let dispatcher = Dispatcher::new(
        storage,
        config.meta.graph_base_url.clone(),
        config.meta.api_version.clone(),
    )?;
    dispatcher.send_text(organization_id, to, text, false).await?;
    println!("sent to {to}");
    Ok(())
}
