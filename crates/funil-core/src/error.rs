// SPDX-FileCopyrightText: 2026 Funil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Funil CRM core.

use thiserror::Error;

/// The primary error type used across Funil crates.
#[derive(Debug, Error)]
pub enum FunilError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, migration).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Messaging provider errors (send failure, bad response, missing credentials).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl FunilError {
    /// Wrap an arbitrary error as a storage error.
    pub fn storage(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        FunilError::Storage {
            source: Box::new(source),
        }
    }

    /// Build a provider error with no underlying source.
    pub fn provider(message: impl Into<String>) -> Self {
        FunilError::Provider {
            message: message.into(),
            source: None,
        }
    }
}
