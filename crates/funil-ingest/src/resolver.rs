// SPDX-FileCopyrightText: 2026 Funil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tenant resolution.
//!
//! Attributing a message to the wrong organization is a worse failure than
//! dropping it, so every ambiguous case resolves to `None` and the caller
//! acknowledges the delivery without processing it.

use funil_core::{FunilError, ParsedIncoming, RoutingHints, TenantDirectory};
use tracing::debug;

/// Resolve the owning organization for one webhook delivery.
///
/// Resolution order:
/// 1. Meta `phone_number_id` hint against stored WhatsApp configs.
/// 2. Else, Evolution instance name (payload-level hint, then
///    per-message) against organizations.
/// 3. Else, degraded fallback: the sender phone of the first parsed
///    message, resolved only when exactly one organization owns a lead
///    with that phone system-wide.
///
/// A hint that is present but matches no organization ends resolution
/// with `None`: an unregistered number or instance must never be routed
/// by the weaker phone heuristic.
pub async fn resolve(
    directory: &dyn TenantDirectory,
    parsed: &[ParsedIncoming],
    hints: &RoutingHints,
) -> Result<Option<String>, FunilError> {
    if let Some(phone_number_id) = &hints.phone_number_id {
        let org = directory.org_by_phone_number_id(phone_number_id).await?;
        if org.is_none() {
            debug!(%phone_number_id, "no organization owns this phone_number_id");
        }
        return Ok(org);
    }

    let instances: Vec<&String> = hints
        .instance
        .iter()
        .chain(parsed.iter().filter_map(|m| m.instance.as_ref()))
        .collect();
    if !instances.is_empty() {
        for instance in &instances {
            if let Some(org) = directory.org_by_instance(instance).await? {
                return Ok(Some(org));
            }
        }
        debug!(instance = %instances[0], "no organization owns this instance");
        return Ok(None);
    }

    if let Some(message) = parsed.first() {
        let orgs = directory.orgs_with_lead_phone(&message.phone).await?;
        match orgs.as_slice() {
            [org] => return Ok(Some(org.clone())),
            [] => debug!(phone = %message.phone, "no organization knows this phone"),
            _ => debug!(
                phone = %message.phone,
                candidates = orgs.len(),
                "phone is ambiguous across organizations"
            ),
        }
    }

    Ok(None)
}
