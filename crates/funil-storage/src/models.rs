// SPDX-FileCopyrightText: 2026 Funil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row structs mirroring the SQLite schema.
//!
//! Timestamps are stored as RFC 3339 TEXT columns and surfaced as strings;
//! parsing back to `DateTime` happens at the edges that need it.

/// One tenant organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Organization {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub evolution_url: Option<String>,
    pub evolution_key: Option<String>,
    pub evolution_instance: Option<String>,
    pub lead_limit: i64,
    pub instance_limit: i64,
    pub created_at: String,
}

/// One phone-number-addressable contact within an organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lead {
    pub id: String,
    pub organization_id: String,
    pub phone: String,
    pub name: String,
    pub status: String,
    pub tags: Vec<String>,
    pub notes: Option<String>,
    pub last_active: String,
    pub avatar_url: Option<String>,
    pub created_at: String,
}

/// One immutable conversation entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub id: String,
    pub lead_id: String,
    pub content: String,
    pub sender_type: String,
    pub is_ai_generated: bool,
    pub created_at: String,
    pub provider: String,
    pub external_id: Option<String>,
    pub media_type: Option<String>,
    pub media_url: Option<String>,
    pub mime_type: Option<String>,
    pub file_name: Option<String>,
    pub caption: Option<String>,
    pub raw_payload: Option<String>,
}

/// One recorded debug-sink event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugEventRow {
    pub id: String,
    pub provider: Option<String>,
    pub event_type: Option<String>,
    pub instance: Option<String>,
    pub phone: Option<String>,
    pub external_id: Option<String>,
    pub messages_parsed: i64,
    pub drop_reason: Option<String>,
    pub content_sample: Option<String>,
    pub raw_payload: Option<String>,
    pub created_at: String,
}
