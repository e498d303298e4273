// SPDX-FileCopyrightText: 2026 Funil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lead queries.

use chrono::{DateTime, Utc};
use funil_core::FunilError;
use rusqlite::{OptionalExtension, params};
use uuid::Uuid;

use crate::database::{Database, map_tr_err};
use crate::models::Lead;

/// Insert or refresh the lead for one phone within an organization.
///
/// The phone number itself stands in as the display name until a real
/// name arrives; once a lead carries a real name, a later contact without
/// one never degrades it back.
pub async fn upsert_lead(
    db: &Database,
    organization_id: &str,
    phone: &str,
    display_name: Option<&str>,
    last_active: DateTime<Utc>,
) -> Result<String, FunilError> {
    let organization_id = organization_id.to_string();
    let phone = phone.to_string();
    let insert_name = display_name.unwrap_or(&phone).to_string();
    let real_name = display_name
        .filter(|name| !name.is_empty() && *name != phone)
        .map(str::to_string);
    let last_active = last_active.to_rfc3339();
    let id = Uuid::new_v4().to_string();
    let created_at = Utc::now().to_rfc3339();

    db.connection()
        .call(move |conn| {
            let id: String = conn.query_row(
                "INSERT INTO leads
                 (id, organization_id, phone, name, status, tags, last_active, created_at)
                 VALUES (?1, ?2, ?3, ?4, 'new', '[\"inbound\"]', ?5, ?6)
                 ON CONFLICT (organization_id, phone) DO UPDATE SET
                   last_active = excluded.last_active,
                   name = COALESCE(?7, leads.name)
                 RETURNING id",
                params![id, organization_id, phone, insert_name, last_active, created_at, real_name],
                |row| row.get(0),
            )?;
            Ok(id)
        })
        .await
        .map_err(map_tr_err)
}

/// Look up one lead by organization and phone.
pub async fn lead_by_phone(
    db: &Database,
    organization_id: &str,
    phone: &str,
) -> Result<Option<Lead>, FunilError> {
    let organization_id = organization_id.to_string();
    let phone = phone.to_string();
    db.connection()
        .call(move |conn| {
            let lead = conn
                .query_row(
                    "SELECT id, organization_id, phone, name, status, tags, notes,
                            last_active, avatar_url, created_at
                     FROM leads WHERE organization_id = ?1 AND phone = ?2",
                    params![organization_id, phone],
                    row_to_lead,
                )
                .optional()?;
            Ok(lead)
        })
        .await
        .map_err(map_tr_err)
}

/// Look up one lead by id.
pub async fn get_lead(db: &Database, id: &str) -> Result<Option<Lead>, FunilError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let lead = conn
                .query_row(
                    "SELECT id, organization_id, phone, name, status, tags, notes,
                            last_active, avatar_url, created_at
                     FROM leads WHERE id = ?1",
                    params![id],
                    row_to_lead,
                )
                .optional()?;
            Ok(lead)
        })
        .await
        .map_err(map_tr_err)
}

/// All organization ids that know the given phone, newest lead first.
pub async fn orgs_with_lead_phone(
    db: &Database,
    phone: &str,
) -> Result<Vec<String>, FunilError> {
    let phone = phone.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT organization_id FROM leads
                 WHERE phone = ?1 ORDER BY created_at DESC",
            )?;
            let ids = stmt
                .query_map(params![phone], |row| row.get(0))?
                .collect::<Result<Vec<String>, _>>()?;
            Ok(ids)
        })
        .await
        .map_err(map_tr_err)
}

fn row_to_lead(row: &rusqlite::Row<'_>) -> rusqlite::Result<Lead> {
    let tags: String = row.get(5)?;
    Ok(Lead {
        id: row.get(0)?,
        organization_id: row.get(1)?,
        phone: row.get(2)?,
        name: row.get(3)?,
        status: row.get(4)?,
        tags: serde_json::from_str(&tags).unwrap_or_default(),
        notes: row.get(6)?,
        last_active: row.get(7)?,
        avatar_url: row.get(8)?,
        created_at: row.get(9)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{open_test_db, seed_org};

    #[tokio::test]
    async fn upsert_creates_then_reuses_lead() {
        let (db, _dir) = open_test_db().await;
        seed_org(&db, "org-1", None).await;

        let first = upsert_lead(&db, "org-1", "5511999990000", None, Utc::now())
            .await
            .unwrap();
        let second = upsert_lead(&db, "org-1", "5511999990000", None, Utc::now())
            .await
            .unwrap();
        assert_eq!(first, second);

        let lead = get_lead(&db, &first).await.unwrap().unwrap();
        // Without a pushName the phone stands in as the display name.
        assert_eq!(lead.name, "5511999990000");
        assert_eq!(lead.status, "new");
        assert_eq!(lead.tags, vec!["inbound".to_string()]);
    }

    #[tokio::test]
    async fn real_name_survives_nameless_followup() {
        let (db, _dir) = open_test_db().await;
        seed_org(&db, "org-1", None).await;

        let id = upsert_lead(&db, "org-1", "5511999990000", Some("Maria"), Utc::now())
            .await
            .unwrap();
        upsert_lead(&db, "org-1", "5511999990000", None, Utc::now())
            .await
            .unwrap();

        let lead = get_lead(&db, &id).await.unwrap().unwrap();
        assert_eq!(lead.name, "Maria");
    }

    #[tokio::test]
    async fn name_upgrades_from_phone_placeholder() {
        let (db, _dir) = open_test_db().await;
        seed_org(&db, "org-1", None).await;

        let id = upsert_lead(&db, "org-1", "5511999990000", None, Utc::now())
            .await
            .unwrap();
        upsert_lead(&db, "org-1", "5511999990000", Some("Maria"), Utc::now())
            .await
            .unwrap();

        let lead = get_lead(&db, &id).await.unwrap().unwrap();
        assert_eq!(lead.name, "Maria");
    }

    #[tokio::test]
    async fn same_phone_in_two_orgs_stays_separate() {
        let (db, _dir) = open_test_db().await;
        seed_org(&db, "org-1", None).await;
        seed_org(&db, "org-2", None).await;

        let a = upsert_lead(&db, "org-1", "5511999990000", None, Utc::now())
            .await
            .unwrap();
        let b = upsert_lead(&db, "org-2", "5511999990000", None, Utc::now())
            .await
            .unwrap();
        assert_ne!(a, b);

        let orgs = orgs_with_lead_phone(&db, "5511999990000").await.unwrap();
        assert_eq!(orgs.len(), 2);
    }
}
