// SPDX-FileCopyrightText: 2026 Funil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound text dispatch.
//!
//! Unlike the inbound pipeline this path is synchronous request/response:
//! send failures propagate to the caller instead of being swallowed.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use funil_core::{
    ConversationStore, EvolutionConfig, FunilError, LeadStore, MetaConfig, NewConversation,
    Provider, SenderType, TenantConfigProvider, digits_only,
};
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::selection::{SelectedProvider, select_provider};

const SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Sends outbound WhatsApp texts and records them in the conversation log.
pub struct Dispatcher<S> {
    client: reqwest::Client,
    store: Arc<S>,
    graph_base_url: String,
    graph_api_version: String,
}

impl<S> Dispatcher<S>
where
    S: TenantConfigProvider + LeadStore + ConversationStore,
{
    pub fn new(
        store: Arc<S>,
        graph_base_url: impl Into<String>,
        graph_api_version: impl Into<String>,
    ) -> Result<Self, FunilError> {
        let client = reqwest::Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .map_err(|e| FunilError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            client,
            store,
            graph_base_url: graph_base_url.into(),
            graph_api_version: graph_api_version.into(),
        })
    }

    /// Send a text to `phone` on behalf of `organization_id`.
    ///
    /// On success the message is appended to the lead's conversation log
    /// as an outbound entry and the lead's `last_active` is refreshed.
    pub async fn send_text(
        &self,
        organization_id: &str,
        phone: &str,
        text: &str,
        is_ai_generated: bool,
    ) -> Result<(), FunilError> {
        let phone = digits_only(phone);
        if phone.is_empty() {
            return Err(FunilError::provider("destination phone has no digits"));
        }

        let config = self.store.get_config(organization_id).await?;
        let (provider, external_id) = match select_provider(&config)? {
            SelectedProvider::Evolution(evolution) => (
                Provider::Evolution,
                self.send_via_evolution(evolution, &phone, text).await?,
            ),
            SelectedProvider::Meta(meta) => (
                Provider::Meta,
                self.send_via_meta(meta, &phone, text).await?,
            ),
        };
        info!(%organization_id, %phone, %provider, "outbound text sent");

        let now = Utc::now();
        let Some(lead_id) = self
            .store
            .upsert_lead(organization_id, &phone, None, now)
            .await
        else {
            return Err(FunilError::Internal(
                "message sent but the lead record could not be updated".to_string(),
            ));
        };
        self.store
            .insert_conversation(
                &lead_id,
                &NewConversation {
                    content: text.to_string(),
                    sender_type: SenderType::User,
                    is_ai_generated,
                    created_at: now,
                    provider,
                    external_id,
                    media: None,
                    raw_payload: None,
                },
            )
            .await?;
        Ok(())
    }

    async fn send_via_evolution(
        &self,
        config: &EvolutionConfig,
        phone: &str,
        text: &str,
    ) -> Result<Option<String>, FunilError> {
        let url = format!(
            "{}/message/sendText/{}",
            config.base_url.trim_end_matches('/'),
            config.instance
        );
        let response = self
            .client
            .post(&url)
            .header("apikey", &config.api_key)
            .json(&json!({
                "number": phone,
                "text": text,
                "linkPreview": false,
            }))
            .send()
            .await
            .map_err(send_error)?;
        let body = check_status(response).await?;
        // Evolution echoes the assigned message key.
        Ok(body
            .get("key")
            .and_then(|k| k.get("id"))
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    async fn send_via_meta(
        &self,
        config: &MetaConfig,
        phone: &str,
        text: &str,
    ) -> Result<Option<String>, FunilError> {
        let url = format!(
            "{}/{}/{}/messages",
            self.graph_base_url.trim_end_matches('/'),
            self.graph_api_version,
            config.phone_number_id
        );
        let response = self
            .client
            .post(&url)
            .bearer_auth(&config.access_token)
            .json(&json!({
                "messaging_product": "whatsapp",
                "to": phone,
                "type": "text",
                "text": { "body": text },
            }))
            .send()
            .await
            .map_err(send_error)?;
        let body = check_status(response).await?;
        Ok(body
            .get("messages")
            .and_then(|m| m.get(0))
            .and_then(|m| m.get("id"))
            .and_then(Value::as_str)
            .map(str::to_string))
    }
}

fn send_error(e: reqwest::Error) -> FunilError {
    FunilError::Provider {
        message: format!("send request failed: {e}"),
        source: Some(Box::new(e)),
    }
}

async fn check_status(response: reqwest::Response) -> Result<Value, FunilError> {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    debug!(status = %status, "send response received");
    if !status.is_success() {
        return Err(FunilError::Provider {
            message: format!("provider returned {status}: {body}"),
            source: None,
        });
    }
    Ok(serde_json::from_str(&body).unwrap_or(Value::Null))
}
