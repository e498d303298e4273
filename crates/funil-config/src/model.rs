// SPDX-FileCopyrightText: 2026 Funil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Funil service.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use serde::{Deserialize, Serialize};

/// Top-level Funil configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FunilConfig {
    /// Service identity and logging.
    #[serde(default)]
    pub service: ServiceConfig,

    /// HTTP server bind settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Inbound webhook authentication settings.
    #[serde(default)]
    pub webhook: WebhookConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Meta Cloud API settings shared by all tenants.
    #[serde(default)]
    pub meta: MetaApiConfig,
}

/// Service identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Display name of the service instance.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_service_name() -> String {
    "funil".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// HTTP server bind configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8787
}

/// Inbound webhook authentication configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WebhookConfig {
    /// Shared secret expected in `X-Webhook-Secret`. `None` disables the check.
    #[serde(default)]
    pub secret: Option<String>,

    /// Pre-shared token for Meta's webhook verification handshake.
    /// `None` rejects all handshake attempts.
    #[serde(default)]
    pub verify_token: Option<String>,
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("funil").join("funil.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("funil.db"))
        .to_string_lossy()
        .into_owned()
}

/// Meta Cloud API configuration shared by all tenants.
///
/// Per-tenant credentials (phone_number_id, access_token) live in storage;
/// only the Graph endpoint shape is configured here.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MetaApiConfig {
    /// Graph API version segment, e.g. `v21.0`.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Graph API base URL. Overridable for tests.
    #[serde(default = "default_graph_base_url")]
    pub graph_base_url: String,
}

impl Default for MetaApiConfig {
    fn default() -> Self {
        Self {
            api_version: default_api_version(),
            graph_base_url: default_graph_base_url(),
        }
    }
}

fn default_api_version() -> String {
    "v21.0".to_string()
}

fn default_graph_base_url() -> String {
    "https://graph.facebook.com".to_string()
}
