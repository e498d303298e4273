// SPDX-FileCopyrightText: 2026 Funil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for the Funil CRM.
//!
//! One serialized connection per process, refinery-managed schema, and
//! typed query modules. [`SqliteStorage`] implements the storage traits
//! from `funil-core` that the ingestion pipeline and dispatcher consume.

mod adapter;
mod database;
mod migrations;
pub mod models;
pub mod queries;

pub use adapter::SqliteStorage;
pub use database::Database;
