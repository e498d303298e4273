// SPDX-FileCopyrightText: 2026 Funil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Organization and provider-configuration queries.

use funil_core::{EvolutionConfig, FunilError, MetaConfig, ProviderConfig};
use rusqlite::{OptionalExtension, params};

use crate::database::{Database, map_tr_err};
use crate::models::Organization;

/// Insert a new organization.
pub async fn create_organization(db: &Database, org: &Organization) -> Result<(), FunilError> {
    let org = org.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO organizations
                 (id, name, slug, evolution_url, evolution_key, evolution_instance,
                  lead_limit, instance_limit, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    org.id,
                    org.name,
                    org.slug,
                    org.evolution_url,
                    org.evolution_key,
                    org.evolution_instance,
                    org.lead_limit,
                    org.instance_limit,
                    org.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Get an organization by id.
pub async fn get_organization(
    db: &Database,
    id: &str,
) -> Result<Option<Organization>, FunilError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let org = conn
                .query_row(
                    "SELECT id, name, slug, evolution_url, evolution_key, evolution_instance,
                            lead_limit, instance_limit, created_at
                     FROM organizations WHERE id = ?1",
                    params![id],
                    |row| {
                        Ok(Organization {
                            id: row.get(0)?,
                            name: row.get(1)?,
                            slug: row.get(2)?,
                            evolution_url: row.get(3)?,
                            evolution_key: row.get(4)?,
                            evolution_instance: row.get(5)?,
                            lead_limit: row.get(6)?,
                            instance_limit: row.get(7)?,
                            created_at: row.get(8)?,
                        })
                    },
                )
                .optional()?;
            Ok(org)
        })
        .await
        .map_err(map_tr_err)
}

/// Organization id owning the given Evolution instance name.
pub async fn org_by_instance(
    db: &Database,
    instance: &str,
) -> Result<Option<String>, FunilError> {
    let instance = instance.to_string();
    db.connection()
        .call(move |conn| {
            let id = conn
                .query_row(
                    "SELECT id FROM organizations WHERE evolution_instance = ?1",
                    params![instance],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(id)
        })
        .await
        .map_err(map_tr_err)
}

/// Store (or replace) the Meta Cloud API credentials for an organization.
pub async fn set_whatsapp_config(
    db: &Database,
    organization_id: &str,
    phone_number_id: &str,
    access_token: &str,
    created_at: &str,
) -> Result<(), FunilError> {
    let organization_id = organization_id.to_string();
    let phone_number_id = phone_number_id.to_string();
    let access_token = access_token.to_string();
    let created_at = created_at.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO whatsapp_configs
                 (organization_id, phone_number_id, access_token, created_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (organization_id) DO UPDATE SET
                   phone_number_id = excluded.phone_number_id,
                   access_token = excluded.access_token",
                params![organization_id, phone_number_id, access_token, created_at],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Organization id owning the given Meta phone_number_id.
pub async fn org_by_phone_number_id(
    db: &Database,
    phone_number_id: &str,
) -> Result<Option<String>, FunilError> {
    let phone_number_id = phone_number_id.to_string();
    db.connection()
        .call(move |conn| {
            let id = conn
                .query_row(
                    "SELECT organization_id FROM whatsapp_configs WHERE phone_number_id = ?1",
                    params![phone_number_id],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(id)
        })
        .await
        .map_err(map_tr_err)
}

/// Assemble the provider configuration for one organization.
///
/// Evolution credentials are only reported when url, key, and instance are
/// all present; a partially-configured gateway is treated as absent.
pub async fn provider_config(
    db: &Database,
    organization_id: &str,
) -> Result<ProviderConfig, FunilError> {
    let org = get_organization(db, organization_id).await?;
    let evolution = org.and_then(|org| {
        match (org.evolution_url, org.evolution_key, org.evolution_instance) {
            (Some(base_url), Some(api_key), Some(instance)) => Some(EvolutionConfig {
                base_url,
                api_key,
                instance,
            }),
            _ => None,
        }
    });

    let organization_id = organization_id.to_string();
    let meta = db
        .connection()
        .call(move |conn| {
            let meta = conn
                .query_row(
                    "SELECT phone_number_id, access_token
                     FROM whatsapp_configs WHERE organization_id = ?1",
                    params![organization_id],
                    |row| {
                        Ok(MetaConfig {
                            phone_number_id: row.get(0)?,
                            access_token: row.get(1)?,
                        })
                    },
                )
                .optional()?;
            Ok(meta)
        })
        .await
        .map_err(map_tr_err)?;

    Ok(ProviderConfig { evolution, meta })
}
