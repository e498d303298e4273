// SPDX-FileCopyrightText: 2026 Funil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Funil CRM ingestion service.
//!
//! Layered TOML + environment configuration built on Figment, following the
//! XDG hierarchy with `FUNIL_*` env overrides.

pub mod loader;
pub mod model;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::FunilConfig;
