// SPDX-FileCopyrightText: 2026 Funil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Evolution (Baileys) webhook parsing.
//!
//! Evolution's payload shape varies by deployment and version, so this
//! branch works on raw JSON with chains of tolerant extractors per field
//! instead of fixed serde structs. The output is the same strict
//! [`ParsedIncoming`] the Meta branch produces; nothing downstream sees
//! the wire variability.

use chrono::Utc;
use funil_core::{MediaAttachment, ParsedIncoming, Provider, RoutingHints, digits_only};
use serde_json::Value;

use super::meta::media_placeholder;
use super::normalize_timestamp;

pub(super) fn parse(payload: &Value) -> (Vec<ParsedIncoming>, RoutingHints) {
    let hints = RoutingHints {
        phone_number_id: None,
        instance: payload_instance(payload),
        event_type: str_field(payload, &["event", "type"]),
    };

    let mut messages = Vec::new();
    for candidate in candidates(payload) {
        if let Some(message) = parse_candidate(candidate, hints.instance.as_deref()) {
            messages.push(message);
        }
    }
    (messages, hints)
}

/// Normalize the varying envelope shapes into message-like candidates.
///
/// In order: an array body, a `data` array, a `data.messages` array, a
/// single `data` object, or the whole body as one candidate.
fn candidates(payload: &Value) -> Vec<&Value> {
    if let Value::Array(items) = payload {
        return items.iter().collect();
    }
    if let Some(data) = payload.get("data") {
        if let Value::Array(items) = data {
            return items.iter().collect();
        }
        if let Some(Value::Array(items)) = data.get("messages") {
            return items.iter().collect();
        }
        if data.is_object() {
            return vec![data];
        }
    }
    vec![payload]
}

fn parse_candidate(candidate: &Value, payload_instance: Option<&str>) -> Option<ParsedIncoming> {
    let key = candidate.get("key");

    // Echoes of the account's own outbound messages come back through the
    // same webhook; storing them would duplicate the send path's records.
    if key
        .and_then(|k| k.get("fromMe"))
        .and_then(Value::as_bool)
        .unwrap_or(false)
    {
        return None;
    }

    let jid = key
        .and_then(|k| k.get("remoteJid"))
        .and_then(Value::as_str)
        .or_else(|| str_value(candidate, "remoteJid"))
        .or_else(|| str_value(candidate, "from"))
        .or_else(|| str_value(candidate, "sender"))?;
    let phone = digits_only(jid.split('@').next().unwrap_or(jid));
    if phone.is_empty() {
        return None;
    }

    let body = candidate.get("message").unwrap_or(candidate);
    let media = extract_media(body);
    let content = text_content(candidate, body).or_else(|| {
        media
            .as_ref()
            .map(|m| media_placeholder(&m.media_type).to_string())
    })?;

    // The WhatsApp message key id is the stable identifier; top-level ids
    // are not guaranteed unique across inbound and outbound traffic.
    let external_id = key
        .and_then(|k| k.get("id"))
        .and_then(Value::as_str)
        .or_else(|| str_value(candidate, "id"))
        .map(str::to_string);

    let name = str_value(candidate, "pushName")
        .filter(|name| !name.is_empty() && *name != phone)
        .map(str::to_string);

    let timestamp = ["messageTimestamp", "timestamp", "t", "date_time"]
        .iter()
        .find_map(|field| candidate.get(field).and_then(normalize_timestamp))
        .unwrap_or_else(Utc::now);

    let instance = str_field(candidate, &["instance", "instanceName"])
        .or_else(|| payload_instance.map(str::to_string));

    Some(ParsedIncoming {
        provider: Provider::Evolution,
        phone,
        name,
        content,
        media,
        timestamp,
        external_id,
        instance,
    })
}

fn text_content(candidate: &Value, body: &Value) -> Option<String> {
    body.get("conversation")
        .and_then(Value::as_str)
        .or_else(|| {
            body.get("extendedTextMessage")
                .and_then(|e| e.get("text"))
                .and_then(Value::as_str)
        })
        .or_else(|| candidate.get("conversation").and_then(Value::as_str))
        .or_else(|| candidate.get("text").and_then(Value::as_str))
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

fn extract_media(body: &Value) -> Option<MediaAttachment> {
    let kinds = [
        ("image", "imageMessage"),
        ("video", "videoMessage"),
        ("document", "documentMessage"),
        ("audio", "audioMessage"),
        ("sticker", "stickerMessage"),
    ];
    for (media_type, field) in kinds {
        if let Some(media) = body.get(field).filter(|m| m.is_object()) {
            return Some(MediaAttachment {
                media_type: media_type.to_string(),
                url: str_value(media, "url").map(str::to_string),
                mime_type: str_value(media, "mimetype").map(str::to_string),
                file_name: str_value(media, "fileName").map(str::to_string),
                caption: str_value(media, "caption").map(str::to_string),
            });
        }
    }
    None
}

fn payload_instance(payload: &Value) -> Option<String> {
    str_field(payload, &["instance", "instanceName"])
}

fn str_field(value: &Value, fields: &[&str]) -> Option<String> {
    fields
        .iter()
        .find_map(|field| str_value(value, field))
        .map(str::to_string)
}

fn str_value<'a>(value: &'a Value, field: &str) -> Option<&'a str> {
    value.get(field).and_then(Value::as_str)
}
