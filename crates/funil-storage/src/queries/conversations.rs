// SPDX-FileCopyrightText: 2026 Funil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation log queries.

use funil_core::{FunilError, InsertOutcome, NewConversation};
use rusqlite::params;
use uuid::Uuid;

use crate::database::{Database, map_tr_err};
use crate::models::Conversation;

/// Append one message to a lead's conversation log.
///
/// Rows carrying a provider message id are deduplicated on
/// (provider, external_id); a replayed webhook comes back as
/// [`InsertOutcome::Duplicate`] without touching the log.
///
/// `include_raw`: older deployments predate the raw_payload column, so the
/// caller can retry without it when the first attempt fails.
pub async fn insert_conversation(
    db: &Database,
    lead_id: &str,
    message: &NewConversation,
    include_raw: bool,
) -> Result<InsertOutcome, FunilError> {
    let id = Uuid::new_v4().to_string();
    let lead_id = lead_id.to_string();
    let message = message.clone();
    db.connection()
        .call(move |conn| {
            let media = message.media.as_ref();
            let sender_type = message.sender_type.to_string();
            let provider = message.provider.to_string();
            let created_at = message.created_at.to_rfc3339();
            let media_type = media.map(|m| m.media_type.clone());
            let media_url = media.and_then(|m| m.url.clone());
            let mime_type = media.and_then(|m| m.mime_type.clone());
            let file_name = media.and_then(|m| m.file_name.clone());
            let caption = media.and_then(|m| m.caption.clone());
            let changed = if include_raw {
                conn.execute(
                    "INSERT INTO conversations
                     (id, lead_id, content, sender_type, is_ai_generated, created_at,
                      provider, external_id, media_type, media_url, mime_type,
                      file_name, caption, raw_payload)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
                     ON CONFLICT (provider, external_id) WHERE external_id IS NOT NULL
                     DO NOTHING",
                    params![
                        id,
                        lead_id,
                        message.content,
                        sender_type,
                        message.is_ai_generated,
                        created_at,
                        provider,
                        message.external_id,
                        media_type,
                        media_url,
                        mime_type,
                        file_name,
                        caption,
                        message.raw_payload,
                    ],
                )?
            } else {
                conn.execute(
                    "INSERT INTO conversations
                     (id, lead_id, content, sender_type, is_ai_generated, created_at,
                      provider, external_id, media_type, media_url, mime_type,
                      file_name, caption)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
                     ON CONFLICT (provider, external_id) WHERE external_id IS NOT NULL
                     DO NOTHING",
                    params![
                        id,
                        lead_id,
                        message.content,
                        sender_type,
                        message.is_ai_generated,
                        created_at,
                        provider,
                        message.external_id,
                        media_type,
                        media_url,
                        mime_type,
                        file_name,
                        caption,
                    ],
                )?
            };
            Ok(if changed == 0 {
                InsertOutcome::Duplicate
            } else {
                InsertOutcome::Inserted
            })
        })
        .await
        .map_err(map_tr_err)
}

/// Full conversation log for one lead, oldest first.
pub async fn list_for_lead(db: &Database, lead_id: &str) -> Result<Vec<Conversation>, FunilError> {
    let lead_id = lead_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, lead_id, content, sender_type, is_ai_generated, created_at,
                        provider, external_id, media_type, media_url, mime_type,
                        file_name, caption, raw_payload
                 FROM conversations WHERE lead_id = ?1
                 ORDER BY created_at ASC, id ASC",
            )?;
            let rows = stmt
                .query_map(params![lead_id], |row| {
                    Ok(Conversation {
                        id: row.get(0)?,
                        lead_id: row.get(1)?,
                        content: row.get(2)?,
                        sender_type: row.get(3)?,
                        is_ai_generated: row.get(4)?,
                        created_at: row.get(5)?,
                        provider: row.get(6)?,
                        external_id: row.get(7)?,
                        media_type: row.get(8)?,
                        media_url: row.get(9)?,
                        mime_type: row.get(10)?,
                        file_name: row.get(11)?,
                        caption: row.get(12)?,
                        raw_payload: row.get(13)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::leads::upsert_lead;
    use crate::test_support::{open_test_db, seed_org, text_message};
    use chrono::Utc;

    #[tokio::test]
    async fn replayed_external_id_is_dropped() {
        let (db, _dir) = open_test_db().await;
        seed_org(&db, "org-1", None).await;
        let lead = upsert_lead(&db, "org-1", "5511999990000", None, Utc::now())
            .await
            .unwrap();

        let message = text_message("oi", Some("wamid.ABC"));
        let first = insert_conversation(&db, &lead, &message, true).await.unwrap();
        let second = insert_conversation(&db, &lead, &message, true).await.unwrap();
        assert_eq!(first, InsertOutcome::Inserted);
        assert_eq!(second, InsertOutcome::Duplicate);

        let log = list_for_lead(&db, &lead).await.unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].content, "oi");
    }

    #[tokio::test]
    async fn messages_without_external_id_always_append() {
        let (db, _dir) = open_test_db().await;
        seed_org(&db, "org-1", None).await;
        let lead = upsert_lead(&db, "org-1", "5511999990000", None, Utc::now())
            .await
            .unwrap();

        let message = text_message("sem id", None);
        insert_conversation(&db, &lead, &message, true).await.unwrap();
        insert_conversation(&db, &lead, &message, true).await.unwrap();

        let log = list_for_lead(&db, &lead).await.unwrap();
        assert_eq!(log.len(), 2);
    }

    #[tokio::test]
    async fn media_columns_round_trip() {
        let (db, _dir) = open_test_db().await;
        seed_org(&db, "org-1", None).await;
        let lead = upsert_lead(&db, "org-1", "5511999990000", None, Utc::now())
            .await
            .unwrap();

        let mut message = text_message("[Imagem]", Some("wamid.IMG"));
        message.media = Some(funil_core::MediaAttachment {
            media_type: "image".into(),
            url: Some("https://cdn.example/img.jpg".into()),
            mime_type: Some("image/jpeg".into()),
            file_name: None,
            caption: Some("foto".into()),
        });
        insert_conversation(&db, &lead, &message, true).await.unwrap();

        let log = list_for_lead(&db, &lead).await.unwrap();
        assert_eq!(log[0].media_type.as_deref(), Some("image"));
        assert_eq!(log[0].caption.as_deref(), Some("foto"));
    }
}
