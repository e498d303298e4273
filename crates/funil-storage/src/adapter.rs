// SPDX-FileCopyrightText: 2026 Funil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed implementations of the core storage traits.

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use funil_core::{
    ConversationStore, DebugEvent, DebugSink, FunilError, InsertOutcome, LeadStore,
    NewConversation, ProviderConfig, TenantConfigProvider, TenantDirectory,
};
use tracing::{debug, warn};

use crate::database::Database;
use crate::queries;

/// Handle over the funil SQLite database.
///
/// Cheap to clone; all clones share one serialized connection.
#[derive(Clone)]
pub struct SqliteStorage {
    db: Database,
}

impl SqliteStorage {
    /// Open (creating and migrating if needed) the database at `path`.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, FunilError> {
        let db = Database::open(path).await?;
        Ok(Self { db })
    }

    /// Direct access to the underlying database for query modules.
    pub fn database(&self) -> &Database {
        &self.db
    }

    pub async fn close(self) -> Result<(), FunilError> {
        self.db.close().await
    }
}

#[async_trait]
impl TenantDirectory for SqliteStorage {
    async fn org_by_phone_number_id(
        &self,
        phone_number_id: &str,
    ) -> Result<Option<String>, FunilError> {
        queries::orgs::org_by_phone_number_id(&self.db, phone_number_id).await
    }

    async fn org_by_instance(&self, instance: &str) -> Result<Option<String>, FunilError> {
        queries::orgs::org_by_instance(&self.db, instance).await
    }

    async fn orgs_with_lead_phone(&self, phone: &str) -> Result<Vec<String>, FunilError> {
        queries::leads::orgs_with_lead_phone(&self.db, phone).await
    }
}

#[async_trait]
impl TenantConfigProvider for SqliteStorage {
    async fn get_config(&self, organization_id: &str) -> Result<ProviderConfig, FunilError> {
        queries::orgs::provider_config(&self.db, organization_id).await
    }
}

#[async_trait]
impl LeadStore for SqliteStorage {
    async fn upsert_lead(
        &self,
        organization_id: &str,
        phone: &str,
        display_name: Option<&str>,
        last_active: DateTime<Utc>,
    ) -> Option<String> {
        match queries::leads::upsert_lead(&self.db, organization_id, phone, display_name, last_active)
            .await
        {
            Ok(id) => Some(id),
            Err(error) => {
                warn!(%organization_id, %phone, %error, "lead upsert failed");
                None
            }
        }
    }
}

#[async_trait]
impl ConversationStore for SqliteStorage {
    async fn insert_conversation(
        &self,
        lead_id: &str,
        entry: &NewConversation,
    ) -> Result<InsertOutcome, FunilError> {
        let outcome = match queries::conversations::insert_conversation(&self.db, lead_id, entry, true)
            .await
        {
            Ok(outcome) => outcome,
            // Databases migrated before the raw_payload column existed reject
            // the full column list; retry once without it.
            Err(error) if error.to_string().contains("raw_payload") => {
                debug!(%lead_id, "raw_payload column missing, retrying without it");
                queries::conversations::insert_conversation(&self.db, lead_id, entry, false).await?
            }
            Err(error) => return Err(error),
        };
        if outcome == InsertOutcome::Duplicate {
            debug!(
                %lead_id,
                external_id = entry.external_id.as_deref().unwrap_or(""),
                "duplicate delivery skipped"
            );
        }
        Ok(outcome)
    }
}

#[async_trait]
impl DebugSink for SqliteStorage {
    async fn record(&self, event: DebugEvent) {
        if let Err(error) = queries::debug_events::insert_event(&self.db, &event).await {
            debug!(%error, "debug event not recorded");
        }
    }
}
