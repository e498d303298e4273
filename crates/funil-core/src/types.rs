// SPDX-FileCopyrightText: 2026 Funil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common domain types shared across the Funil workspace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Which WhatsApp provider an event or message came through.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Meta's official WhatsApp Business Cloud API.
    Meta,
    /// Self-hosted Evolution (Baileys) gateway.
    Evolution,
}

/// Who authored a conversation entry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SenderType {
    /// Outbound: an agent, the system, or an AI draft sent on the org's behalf.
    User,
    /// Inbound: the lead themselves.
    Contact,
}

/// Sales-funnel status of a lead.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    New,
    Contacted,
    Qualified,
    Customer,
    Lost,
}

/// Best-effort media metadata extracted from a provider payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaAttachment {
    /// Media kind as reported by the provider (image, video, document, audio).
    pub media_type: String,
    /// Download URL, when the provider included one.
    pub url: Option<String>,
    pub mime_type: Option<String>,
    pub file_name: Option<String>,
    pub caption: Option<String>,
}

/// One normalized inbound message, the parser's only output shape.
///
/// The rest of the pipeline never sees raw provider payloads; all of the
/// wire-format variability is absorbed before this struct is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedIncoming {
    pub provider: Provider,
    /// Sender phone, digits only.
    pub phone: String,
    /// Display name, when the provider supplied one distinct from the phone.
    pub name: Option<String>,
    /// Text body, or a placeholder when the message carried only media.
    pub content: String,
    pub media: Option<MediaAttachment>,
    pub timestamp: DateTime<Utc>,
    /// Provider message identifier; the idempotency key when present.
    pub external_id: Option<String>,
    /// Evolution instance name routing hint, when present on the candidate.
    pub instance: Option<String>,
}

/// Routing hints extracted at the payload level rather than per message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingHints {
    /// Meta `value.metadata.phone_number_id`, when present.
    pub phone_number_id: Option<String>,
    /// Payload-level Evolution instance name, when present.
    pub instance: Option<String>,
    /// Provider event type string (e.g. `messages.upsert`), for diagnostics.
    pub event_type: Option<String>,
}

/// Why a webhook delivery was dropped instead of ingested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// Payload parsed cleanly but contained no ingestible messages
    /// (status callbacks, connection events, heartbeats).
    ParsedZeroMessages,
    /// No organization could be attributed with confidence.
    OrgNotResolved,
    /// The body was not JSON at all.
    ParseFailure,
}

impl DropReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ParsedZeroMessages => "parsed_zero_messages",
            Self::OrgNotResolved => "org_not_resolved",
            Self::ParseFailure => "parse_failure",
        }
    }
}

/// A diagnostic record for the debug sink.
///
/// Everything here is best-effort forensic data; none of it participates in
/// routing or ingestion decisions.
#[derive(Debug, Clone)]
pub struct DebugEvent {
    pub provider: Option<Provider>,
    pub event_type: Option<String>,
    pub instance: Option<String>,
    pub phone: Option<String>,
    pub external_id: Option<String>,
    pub messages_parsed: i64,
    pub drop_reason: DropReason,
    /// Truncated content excerpt for operator triage.
    pub content_sample: Option<String>,
    /// Raw payload for forensic replay.
    pub raw_payload: String,
}

/// Evolution gateway credentials for one organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvolutionConfig {
    pub base_url: String,
    pub api_key: String,
    pub instance: String,
}

/// Meta Cloud API credentials for one organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaConfig {
    pub phone_number_id: String,
    pub access_token: String,
}

/// Per-organization provider configuration, as read from storage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderConfig {
    pub evolution: Option<EvolutionConfig>,
    pub meta: Option<MetaConfig>,
}

/// Whether a conversation insert landed a new row or hit the dedup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    Duplicate,
}

/// A conversation row ready for insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct NewConversation {
    pub content: String,
    pub sender_type: SenderType,
    pub is_ai_generated: bool,
    pub created_at: DateTime<Utc>,
    pub provider: Provider,
    pub external_id: Option<String>,
    pub media: Option<MediaAttachment>,
    /// Raw provider payload capture; optional column, may be absent from
    /// older schemas (see the drift retry in the conversation store).
    pub raw_payload: Option<String>,
}

/// Strips everything but ASCII digits from a phone-like string.
///
/// This is the only phone normalization the system performs; country-code
/// ambiguity is deliberately not resolved here.
pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn provider_round_trips_lowercase() {
        assert_eq!(Provider::Meta.to_string(), "meta");
        assert_eq!(Provider::Evolution.to_string(), "evolution");
        assert_eq!(Provider::from_str("meta").unwrap(), Provider::Meta);
        assert_eq!(
            Provider::from_str("evolution").unwrap(),
            Provider::Evolution
        );
    }

    #[test]
    fn sender_type_wire_form() {
        assert_eq!(SenderType::User.to_string(), "user");
        assert_eq!(SenderType::Contact.to_string(), "contact");
    }

    #[test]
    fn lead_status_parses_all_variants() {
        for s in ["new", "contacted", "qualified", "customer", "lost"] {
            LeadStatus::from_str(s).unwrap();
        }
    }

    #[test]
    fn drop_reason_wire_strings() {
        assert_eq!(
            DropReason::ParsedZeroMessages.as_str(),
            "parsed_zero_messages"
        );
        assert_eq!(DropReason::OrgNotResolved.as_str(), "org_not_resolved");
        assert_eq!(DropReason::ParseFailure.as_str(), "parse_failure");
    }

    #[test]
    fn digits_only_strips_jid_noise() {
        assert_eq!(digits_only("+55 (11) 99999-9999"), "5511999999999");
        assert_eq!(digits_only("5511999999999"), "5511999999999");
        assert_eq!(digits_only("no digits"), "");
    }

    #[test]
    fn provider_serde_is_lowercase() {
        let json = serde_json::to_string(&Provider::Evolution).unwrap();
        assert_eq!(json, "\"evolution\"");
    }
}
