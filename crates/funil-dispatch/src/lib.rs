// SPDX-FileCopyrightText: 2026 Funil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound WhatsApp dispatch.
//!
//! Chooses a provider per organization and performs the send, mirroring
//! the inbound pipeline's provider split in the opposite direction.

pub mod dispatcher;
pub mod selection;

pub use dispatcher::Dispatcher;
pub use selection::{SelectedProvider, select_provider};
