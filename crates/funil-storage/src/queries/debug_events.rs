// SPDX-FileCopyrightText: 2026 Funil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook debug event queries.

use chrono::Utc;
use funil_core::{DebugEvent, FunilError};
use rusqlite::params;
use uuid::Uuid;

use crate::database::{Database, map_tr_err};
use crate::models::DebugEventRow;

/// Record one webhook delivery snapshot.
pub async fn insert_event(db: &Database, event: &DebugEvent) -> Result<(), FunilError> {
    let id = Uuid::new_v4().to_string();
    let event = event.clone();
    let created_at = Utc::now().to_rfc3339();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO webhook_debug_events
                 (id, provider, event_type, instance, phone, external_id,
                  messages_parsed, drop_reason, content_sample, raw_payload, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    id,
                    event.provider.map(|provider| provider.to_string()),
                    event.event_type,
                    event.instance,
                    event.phone,
                    event.external_id,
                    event.messages_parsed,
                    event.drop_reason.as_str(),
                    event.content_sample,
                    event.raw_payload,
                    created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Most recent debug events, newest first.
pub async fn recent_events(db: &Database, limit: i64) -> Result<Vec<DebugEventRow>, FunilError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, provider, event_type, instance, phone, external_id,
                        messages_parsed, drop_reason, content_sample, raw_payload, created_at
                 FROM webhook_debug_events
                 ORDER BY created_at DESC, id DESC LIMIT ?1",
            )?;
            let rows = stmt
                .query_map(params![limit], |row| {
                    Ok(DebugEventRow {
                        id: row.get(0)?,
                        provider: row.get(1)?,
                        event_type: row.get(2)?,
                        instance: row.get(3)?,
                        phone: row.get(4)?,
                        external_id: row.get(5)?,
                        messages_parsed: row.get(6)?,
                        drop_reason: row.get(7)?,
                        content_sample: row.get(8)?,
                        raw_payload: row.get(9)?,
                        created_at: row.get(10)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
        .map_err(map_tr_err)
}
