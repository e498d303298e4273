// SPDX-FileCopyrightText: 2026 Funil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP surface of the Funil ingestion service.

pub mod handlers;
pub mod server;

pub use server::{AppState, router, start_server};
