// SPDX-FileCopyrightText: 2026 Funil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The ingestion pipeline: parse, resolve, upsert, persist.
//!
//! One invocation per webhook delivery. Nothing here returns an error to
//! the HTTP layer; every failure mode collapses into an [`IngestOutcome`]
//! the handler acknowledges with 200 so the provider never retry-storms.

use std::sync::Arc;

use funil_core::{
    ConversationStore, DebugEvent, DebugSink, DropReason, InsertOutcome, LeadStore,
    NewConversation, SenderType, TenantDirectory,
};
use serde_json::Value;
use tracing::{info, warn};

use crate::parser;
use crate::resolver;

const CONTENT_SAMPLE_CHARS: usize = 120;

/// How one webhook delivery was disposed of. All variants are acknowledged
/// with success upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// At least one message reached the persistence step.
    Accepted { stored: usize, skipped: usize },
    /// Parsed cleanly but carried nothing ingestible.
    NoMessages,
    /// No organization could be attributed with confidence.
    Unresolved,
    /// The body was not JSON.
    Malformed,
}

/// Webhook ingestion pipeline over one storage backend.
pub struct Pipeline<S> {
    store: Arc<S>,
}

impl<S> Pipeline<S>
where
    S: TenantDirectory + LeadStore + ConversationStore + DebugSink,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Process one raw webhook body.
    pub async fn process(&self, body: &str) -> IngestOutcome {
        let payload: Value = match serde_json::from_str(body) {
            Ok(payload) => payload,
            Err(error) => {
                warn!(%error, "webhook body is not JSON");
                self.store
                    .record(DebugEvent {
                        provider: None,
                        event_type: None,
                        instance: None,
                        phone: None,
                        external_id: None,
                        messages_parsed: 0,
                        drop_reason: DropReason::ParseFailure,
                        content_sample: Some(sample(body)),
                        raw_payload: body.to_string(),
                    })
                    .await;
                return IngestOutcome::Malformed;
            }
        };

        let output = parser::parse(&payload);
        if output.messages.is_empty() {
            self.store
                .record(DebugEvent {
                    provider: Some(output.provider),
                    event_type: output.hints.event_type.clone(),
                    instance: output.hints.instance.clone(),
                    phone: None,
                    external_id: None,
                    messages_parsed: 0,
                    drop_reason: DropReason::ParsedZeroMessages,
                    content_sample: None,
                    raw_payload: body.to_string(),
                })
                .await;
            return IngestOutcome::NoMessages;
        }

        let organization = match resolver::resolve(
            self.store.as_ref(),
            &output.messages,
            &output.hints,
        )
        .await
        {
            Ok(Some(org)) => org,
            Ok(None) => {
                self.record_unresolved(body, &output).await;
                return IngestOutcome::Unresolved;
            }
            Err(error) => {
                // A storage failure mid-resolution is indistinguishable
                // from ambiguity for routing purposes; fail closed.
                warn!(%error, "tenant resolution failed");
                self.record_unresolved(body, &output).await;
                return IngestOutcome::Unresolved;
            }
        };

        let mut stored = 0usize;
        let mut skipped = 0usize;
        for message in &output.messages {
            let Some(lead_id) = self
                .store
                .upsert_lead(
                    &organization,
                    &message.phone,
                    message.name.as_deref(),
                    message.timestamp,
                )
                .await
            else {
                skipped += 1;
                continue;
            };

            let entry = NewConversation {
                content: message.content.clone(),
                sender_type: SenderType::Contact,
                is_ai_generated: false,
                created_at: message.timestamp,
                provider: message.provider,
                external_id: message.external_id.clone(),
                media: message.media.clone(),
                raw_payload: Some(body.to_string()),
            };
            match self.store.insert_conversation(&lead_id, &entry).await {
                Ok(InsertOutcome::Inserted) => stored += 1,
                // A replayed delivery is not a new row; count it apart so
                // the ingestion log stays honest.
                Ok(InsertOutcome::Duplicate) => skipped += 1,
                Err(error) => {
                    // One message's failure never aborts its siblings.
                    warn!(
                        %error,
                        phone = %message.phone,
                        external_id = message.external_id.as_deref().unwrap_or(""),
                        "conversation insert failed"
                    );
                    skipped += 1;
                }
            }
        }

        info!(
            organization = %organization,
            stored,
            skipped,
            provider = %output.provider,
            "webhook delivery ingested"
        );
        IngestOutcome::Accepted { stored, skipped }
    }

    async fn record_unresolved(&self, body: &str, output: &parser::ParseOutput) {
        let first = output.messages.first();
        self.store
            .record(DebugEvent {
                provider: Some(output.provider),
                event_type: output.hints.event_type.clone(),
                instance: output
                    .hints
                    .instance
                    .clone()
                    .or_else(|| first.and_then(|m| m.instance.clone())),
                phone: first.map(|m| m.phone.clone()),
                external_id: first.and_then(|m| m.external_id.clone()),
                messages_parsed: output.messages.len() as i64,
                drop_reason: DropReason::OrgNotResolved,
                content_sample: first.map(|m| sample(&m.content)),
                raw_payload: body.to_string(),
            })
            .await;
    }
}

fn sample(content: &str) -> String {
    content.chars().take(CONTENT_SAMPLE_CHARS).collect()
}
