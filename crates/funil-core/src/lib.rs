// SPDX-FileCopyrightText: 2026 Funil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Funil CRM ingestion service.
//!
//! Provides the shared error type, the normalized domain types produced by
//! the payload parser, and the adapter traits that decouple the ingestion
//! pipeline from SQLite.

pub mod error;
pub mod traits;
pub mod types;

pub use error::FunilError;
pub use traits::{
    ConversationStore, DebugSink, LeadStore, TenantConfigProvider, TenantDirectory,
};
pub use types::{
    DebugEvent, DropReason, EvolutionConfig, InsertOutcome, LeadStatus, MediaAttachment,
    MetaConfig, NewConversation, ParsedIncoming, Provider, ProviderConfig, RoutingHints,
    SenderType, digits_only,
};
