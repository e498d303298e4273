// SPDX-FileCopyrightText: 2026 Funil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound message normalization and ingestion.
//!
//! Takes raw webhook bodies from either WhatsApp provider and turns them
//! into leads and conversation rows, or into recorded drops. The pipeline
//! is generic over the storage traits in `funil-core` and performs no HTTP
//! itself; `funil-gateway` owns the endpoint.

pub mod parser;
pub mod pipeline;
pub mod resolver;

pub use parser::{ParseOutput, parse};
pub use pipeline::{IngestOutcome, Pipeline};
pub use resolver::resolve;
