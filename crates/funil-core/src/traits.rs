// SPDX-FileCopyrightText: 2026 Funil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter traits at the seams of the ingestion pipeline.
//!
//! The pipeline is generic over these traits so the parsing and routing
//! logic can be tested without a real database. `funil-storage` provides
//! the SQLite implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::FunilError;
use crate::types::{DebugEvent, InsertOutcome, NewConversation, ProviderConfig};

/// Tenant routing lookups against persistent storage.
#[async_trait]
pub trait TenantDirectory: Send + Sync {
    /// Organization owning the given Meta `phone_number_id`, if any.
    async fn org_by_phone_number_id(
        &self,
        phone_number_id: &str,
    ) -> Result<Option<String>, FunilError>;

    /// Organization owning the given Evolution instance name, if any.
    async fn org_by_instance(&self, instance: &str) -> Result<Option<String>, FunilError>;

    /// Distinct organization ids owning a lead with this phone, system-wide.
    ///
    /// Used only for the degraded fallback when the provider omitted every
    /// routing hint; the caller resolves only on exactly one match.
    async fn orgs_with_lead_phone(&self, phone: &str) -> Result<Vec<String>, FunilError>;
}

/// Per-organization provider credential lookup.
///
/// Injected into the outbound dispatcher (and anything else that needs
/// credentials) so the core stays testable without shared global state.
#[async_trait]
pub trait TenantConfigProvider: Send + Sync {
    async fn get_config(&self, organization_id: &str) -> Result<ProviderConfig, FunilError>;
}

/// Find-or-create contact records.
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Upserts the lead keyed on (organization_id, phone) and returns its id.
    ///
    /// Existing leads get `last_active` refreshed unconditionally; the name
    /// is only replaced when `display_name` is a real name (implementations
    /// must never overwrite a stored name with the bare phone number).
    /// Returns `None` when insertion failed; the caller skips conversation
    /// ingestion for that message without aborting its siblings.
    async fn upsert_lead(
        &self,
        organization_id: &str,
        phone: &str,
        display_name: Option<&str>,
        last_active: DateTime<Utc>,
    ) -> Option<String>;
}

/// Append-only conversation persistence.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Inserts one conversation entry, idempotently when possible.
    ///
    /// (provider, external_id) is the dedup key: a second insert with the
    /// same pair is a no-op reported as [`InsertOutcome::Duplicate`]. When
    /// `external_id` is absent there is no key and the row inserts
    /// unconditionally -- provider retries can then duplicate it. That gap
    /// is inherited from the upstream system and deliberately not papered
    /// over here.
    async fn insert_conversation(
        &self,
        lead_id: &str,
        entry: &NewConversation,
    ) -> Result<InsertOutcome, FunilError>;
}

/// Fire-and-forget diagnostic recording.
///
/// `record` returns `()` by contract: implementations catch every failure
/// internally (including the debug table not existing yet) and must never
/// block or fail the webhook response path.
#[async_trait]
pub trait DebugSink: Send + Sync {
    async fn record(&self, event: DebugEvent);
}
