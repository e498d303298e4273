// SPDX-FileCopyrightText: 2026 Funil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules over the SQLite schema.

pub mod conversations;
pub mod debug_events;
pub mod leads;
pub mod orgs;
