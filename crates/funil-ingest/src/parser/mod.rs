// SPDX-FileCopyrightText: 2026 Funil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider payload parsing.
//!
//! Both branches are pure: they take an already-deserialized JSON value and
//! emit zero or more [`ParsedIncoming`] records plus payload-level routing
//! hints. A payload that yields zero messages is not an error; status
//! callbacks and connection events legitimately parse to nothing.

mod evolution;
mod meta;

use chrono::{DateTime, TimeZone, Utc};
use funil_core::{ParsedIncoming, Provider, RoutingHints};
use serde_json::Value;

/// Everything the parser can tell the pipeline about one webhook delivery.
#[derive(Debug, Clone)]
pub struct ParseOutput {
    pub provider: Provider,
    pub messages: Vec<ParsedIncoming>,
    pub hints: RoutingHints,
}

/// Parse one webhook body into normalized messages.
///
/// Provider discrimination is structural: Meta payloads announce themselves
/// with `object = "whatsapp_business_account"`; everything else is treated
/// as Evolution-shaped.
pub fn parse(payload: &Value) -> ParseOutput {
    if payload.get("object").and_then(Value::as_str) == Some("whatsapp_business_account") {
        let (messages, hints) = meta::parse(payload);
        ParseOutput {
            provider: Provider::Meta,
            messages,
            hints,
        }
    } else {
        let (messages, hints) = evolution::parse(payload);
        ParseOutput {
            provider: Provider::Evolution,
            messages,
            hints,
        }
    }
}

/// Epoch values at or above this are taken to be milliseconds.
const EPOCH_MS_THRESHOLD: i64 = 100_000_000_000;

/// Normalize a provider timestamp field.
///
/// Accepts epoch seconds or milliseconds (numeric or numeric string) and
/// RFC 3339 strings. Returns `None` for anything else; callers fall back
/// to the ingestion time.
pub(crate) fn normalize_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let epoch = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            if let Ok(n) = s.parse::<i64>() {
                Some(n)
            } else {
                return DateTime::parse_from_rfc3339(s)
                    .ok()
                    .map(|dt| dt.with_timezone(&Utc));
            }
        }
        _ => None,
    }?;
    if epoch <= 0 {
        return None;
    }
    if epoch >= EPOCH_MS_THRESHOLD {
        Utc.timestamp_millis_opt(epoch).single()
    } else {
        Utc.timestamp_opt(epoch, 0).single()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn meta_object_discriminator_selects_meta_branch() {
        let output = parse(&json!({
            "object": "whatsapp_business_account",
            "entry": []
        }));
        assert_eq!(output.provider, Provider::Meta);
        assert!(output.messages.is_empty());
    }

    #[test]
    fn anything_else_is_evolution_shaped() {
        let output = parse(&json!({ "event": "connection.update" }));
        assert_eq!(output.provider, Provider::Evolution);
        assert!(output.messages.is_empty());
    }

    #[test]
    fn timestamps_normalize_across_scales() {
        let seconds = normalize_timestamp(&json!(1_726_000_000)).unwrap();
        let millis = normalize_timestamp(&json!(1_726_000_000_000i64)).unwrap();
        assert_eq!(seconds, millis);

        let stringy = normalize_timestamp(&json!("1726000000")).unwrap();
        assert_eq!(stringy, seconds);

        let rfc = normalize_timestamp(&json!("2024-09-10T20:26:40Z")).unwrap();
        assert_eq!(rfc, seconds);

        assert!(normalize_timestamp(&json!("soon")).is_none());
        assert!(normalize_timestamp(&json!(0)).is_none());
        assert!(normalize_timestamp(&json!(null)).is_none());
    }
}
