// SPDX-FileCopyrightText: 2026 Funil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports the XDG hierarchy: `./funil.toml` > `~/.config/funil/funil.toml`
//! > `/etc/funil/funil.toml`, with environment variable overrides via the
//! `FUNIL_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::FunilConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/funil/funil.toml` (system-wide)
/// 3. `~/.config/funil/funil.toml` (user XDG config)
/// 4. `./funil.toml` (local directory)
/// 5. `FUNIL_*` environment variables
pub fn load_config() -> Result<FunilConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FunilConfig::default()))
        .merge(Toml::file("/etc/funil/funil.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("funil/funil.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("funil.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<FunilConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FunilConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<FunilConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FunilConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `FUNIL_WEBHOOK_VERIFY_TOKEN` must map to
/// `webhook.verify_token`, not `webhook.verify.token`.
fn env_provider() -> Env {
    Env::prefixed("FUNIL_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("service_", "service.", 1)
            .replacen("server_", "server.", 1)
            .replacen("webhook_", "webhook.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("meta_", "meta.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_yields_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.service.name, "funil");
        assert_eq!(config.server.port, 8787);
    }

    #[test]
    fn toml_overrides_defaults() {
        let config = load_config_from_str(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9000

            [webhook]
            secret = "s3cret"
            verify_token = "verify-me"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.webhook.secret.as_deref(), Some("s3cret"));
        assert_eq!(config.webhook.verify_token.as_deref(), Some("verify-me"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = load_config_from_str(
            r#"
            [server]
            prot = 9000
            "#,
        );
        assert!(result.is_err(), "typo'd key should fail extraction");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = load_config_from_str(
            r#"
            [storage]
            database_path = "/tmp/funil-test.db"
            "#,
        )
        .unwrap();
        assert_eq!(config.storage.database_path, "/tmp/funil-test.db");
        assert_eq!(config.meta.api_version, "v21.0");
    }
}
