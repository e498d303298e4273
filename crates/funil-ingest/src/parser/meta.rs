// SPDX-FileCopyrightText: 2026 Funil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Meta Cloud API webhook parsing.
//!
//! Meta payloads are well-typed compared to Evolution's, so this branch
//! deserializes into serde structs. Every field is optional or defaulted;
//! a payload that fails to match simply yields no messages.

use chrono::Utc;
use funil_core::{MediaAttachment, ParsedIncoming, Provider, RoutingHints, digits_only};
use serde::Deserialize;
use serde_json::Value;

use super::normalize_timestamp;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MetaPayload {
    entry: Vec<MetaEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MetaEntry {
    changes: Vec<MetaChange>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MetaChange {
    field: Option<String>,
    value: MetaValue,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MetaValue {
    metadata: Option<MetaMetadata>,
    contacts: Vec<MetaContact>,
    /// Absent on delivery/read status callbacks.
    messages: Vec<MetaMessage>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MetaMetadata {
    phone_number_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MetaContact {
    wa_id: Option<String>,
    profile: Option<MetaProfile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MetaProfile {
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MetaMessage {
    from: Option<String>,
    id: Option<String>,
    timestamp: Option<Value>,
    #[serde(rename = "type")]
    kind: Option<String>,
    text: Option<MetaText>,
    image: Option<MetaMedia>,
    video: Option<MetaMedia>,
    document: Option<MetaMedia>,
    audio: Option<MetaMedia>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MetaText {
    body: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MetaMedia {
    mime_type: Option<String>,
    filename: Option<String>,
    caption: Option<String>,
}

pub(super) fn parse(payload: &Value) -> (Vec<ParsedIncoming>, RoutingHints) {
    let mut hints = RoutingHints {
        event_type: Some("meta.webhook".to_string()),
        ..RoutingHints::default()
    };
    let Ok(payload) = serde_json::from_value::<MetaPayload>(payload.clone()) else {
        return (Vec::new(), hints);
    };

    let mut messages = Vec::new();
    for entry in payload.entry {
        for change in entry.changes {
            if let Some(field) = &change.field {
                hints.event_type = Some(format!("meta.{field}"));
            }
            let value = change.value;
            if let Some(metadata) = &value.metadata
                && let Some(phone_number_id) = &metadata.phone_number_id
            {
                hints.phone_number_id = Some(phone_number_id.clone());
            }

            // Contact display names are keyed by wa_id alongside messages.
            let contact_name = |phone: &str| {
                value
                    .contacts
                    .iter()
                    .find(|c| c.wa_id.as_deref().map(digits_only).as_deref() == Some(phone))
                    .or_else(|| value.contacts.first())
                    .and_then(|c| c.profile.as_ref())
                    .and_then(|p| p.name.clone())
                    .filter(|name| !name.is_empty() && name != phone)
            };

            for message in &value.messages {
                let Some(phone) = message
                    .from
                    .as_deref()
                    .map(digits_only)
                    .filter(|p| !p.is_empty())
                else {
                    continue;
                };

                let media = extract_media(message);
                let content = message
                    .text
                    .as_ref()
                    .and_then(|t| t.body.clone())
                    .filter(|body| !body.is_empty())
                    .or_else(|| {
                        media
                            .as_ref()
                            .map(|m| media_placeholder(&m.media_type).to_string())
                    });
                let Some(content) = content else {
                    continue;
                };

                let timestamp = message
                    .timestamp
                    .as_ref()
                    .and_then(normalize_timestamp)
                    .unwrap_or_else(Utc::now);

                messages.push(ParsedIncoming {
                    provider: Provider::Meta,
                    name: contact_name(&phone),
                    phone,
                    content,
                    media,
                    timestamp,
                    external_id: message.id.clone(),
                    instance: None,
                });
            }
        }
    }
    (messages, hints)
}

fn extract_media(message: &MetaMessage) -> Option<MediaAttachment> {
    let (media_type, media) = if let Some(m) = &message.image {
        ("image", m)
    } else if let Some(m) = &message.video {
        ("video", m)
    } else if let Some(m) = &message.document {
        ("document", m)
    } else if let Some(m) = &message.audio {
        ("audio", m)
    } else {
        return None;
    };
    Some(MediaAttachment {
        media_type: media_type.to_string(),
        // Meta media needs a separate authenticated download; no direct URL.
        url: None,
        mime_type: media.mime_type.clone(),
        file_name: media.filename.clone(),
        caption: media.caption.clone(),
    })
}

pub(super) fn media_placeholder(media_type: &str) -> &'static str {
    match media_type {
        "image" => "[Imagem]",
        "video" => "[Vídeo]",
        "audio" => "[Áudio]",
        "document" => "[Documento]",
        "sticker" => "[Figurinha]",
        _ => "[Mídia]",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn text_payload() -> Value {
        json!({
            "object": "whatsapp_business_account",
            "entry": [{
                "changes": [{
                    "field": "messages",
                    "value": {
                        "metadata": { "phone_number_id": "1550001" },
                        "contacts": [{
                            "wa_id": "5511999999999",
                            "profile": { "name": "Maria" }
                        }],
                        "messages": [{
                            "from": "5511999999999",
                            "id": "wamid.ABC123",
                            "timestamp": "1726000000",
                            "type": "text",
                            "text": { "body": "Oi, quero saber mais" }
                        }]
                    }
                }]
            }]
        })
    }

    #[test]
    fn text_message_normalizes() {
        let (messages, hints) = parse(&text_payload());
        assert_eq!(messages.len(), 1);
        let m = &messages[0];
        assert_eq!(m.phone, "5511999999999");
        assert_eq!(m.name.as_deref(), Some("Maria"));
        assert_eq!(m.content, "Oi, quero saber mais");
        assert_eq!(m.external_id.as_deref(), Some("wamid.ABC123"));
        assert_eq!(hints.phone_number_id.as_deref(), Some("1550001"));
        assert_eq!(hints.event_type.as_deref(), Some("meta.messages"));
    }

    #[test]
    fn status_callback_yields_no_messages_but_keeps_hint() {
        let (messages, hints) = parse(&json!({
            "object": "whatsapp_business_account",
            "entry": [{
                "changes": [{
                    "field": "messages",
                    "value": {
                        "metadata": { "phone_number_id": "1550001" },
                        "statuses": [{ "id": "wamid.X", "status": "delivered" }]
                    }
                }]
            }]
        }));
        assert!(messages.is_empty());
        assert_eq!(hints.phone_number_id.as_deref(), Some("1550001"));
    }

    #[test]
    fn image_message_gets_placeholder_and_media() {
        let (messages, _) = parse(&json!({
            "object": "whatsapp_business_account",
            "entry": [{
                "changes": [{
                    "value": {
                        "messages": [{
                            "from": "+55 11 98888-7777",
                            "id": "wamid.IMG",
                            "timestamp": 1726000000,
                            "type": "image",
                            "image": { "mime_type": "image/jpeg", "caption": "orçamento" }
                        }]
                    }
                }]
            }]
        }));
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].phone, "5511988887777");
        assert_eq!(messages[0].content, "[Imagem]");
        let media = messages[0].media.as_ref().unwrap();
        assert_eq!(media.media_type, "image");
        assert_eq!(media.caption.as_deref(), Some("orçamento"));
    }

    #[test]
    fn message_without_sender_is_dropped() {
        let (messages, _) = parse(&json!({
            "object": "whatsapp_business_account",
            "entry": [{
                "changes": [{
                    "value": { "messages": [{ "id": "wamid.NOFROM", "text": { "body": "x" } }] }
                }]
            }]
        }));
        assert!(messages.is_empty());
    }
}
