// SPDX-FileCopyrightText: 2026 Funil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook request handlers.
//!
//! POST responses are plain status strings with a 200 status for every
//! outcome except a bad shared secret; providers treat any non-success as
//! a cue to redeliver, and a retry storm is worse than a logged drop.

use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use funil_ingest::IngestOutcome;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::server::AppState;

const WEBHOOK_SECRET_HEADER: &str = "x-webhook-secret";

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Query parameters of the Meta subscription handshake.
#[derive(Debug, Deserialize)]
pub struct VerifyParams {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

/// GET /health
pub async fn get_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /webhook
///
/// Meta's one-time subscription handshake: echo the challenge when the
/// mode and pre-shared token match, otherwise 403. No side effects.
pub async fn verify_webhook(
    State(state): State<AppState>,
    Query(params): Query<VerifyParams>,
) -> Response {
    let token_matches = match (&state.verify_token, &params.verify_token) {
        (Some(expected), Some(got)) => expected == got,
        _ => false,
    };
    if params.mode.as_deref() == Some("subscribe")
        && token_matches
        && let Some(challenge) = params.challenge
    {
        debug!("webhook subscription verified");
        return (StatusCode::OK, challenge).into_response();
    }
    warn!(mode = params.mode.as_deref().unwrap_or(""), "webhook verification rejected");
    (StatusCode::FORBIDDEN, "Forbidden").into_response()
}

/// POST /webhook
pub async fn receive_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Some(expected) = &state.webhook_secret {
        let presented = headers
            .get(WEBHOOK_SECRET_HEADER)
            .and_then(|v| v.to_str().ok());
        if presented != Some(expected.as_str()) {
            warn!("webhook delivery rejected: bad shared secret");
            return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
        }
    }

    // Raw bytes, not a String extractor: a body that is not valid UTF-8
    // must still be acknowledged instead of bounced with a 400-level
    // status the provider would retry.
    let body = String::from_utf8_lossy(&body);
    let outcome = state.pipeline.process(&body).await;
    let reply = match outcome {
        IngestOutcome::Accepted { .. } => "EVENT_RECEIVED",
        IngestOutcome::NoMessages | IngestOutcome::Unresolved | IngestOutcome::Malformed => {
            "IGNORED"
        }
    };
    (StatusCode::OK, reply).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::{AppState, router};
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use chrono::Utc;
    use funil_storage::{SqliteStorage, models::Organization, queries};
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn test_state(
        secret: Option<&str>,
        verify_token: Option<&str>,
    ) -> (AppState, Arc<SqliteStorage>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(
            SqliteStorage::open(dir.path().join("gateway.db"))
                .await
                .unwrap(),
        );
        let state = AppState::new(
            storage.clone(),
            secret.map(str::to_string),
            verify_token.map(str::to_string),
        );
        (state, storage, dir)
    }

    async fn seed_vendas1(storage: &SqliteStorage) {
        queries::orgs::create_organization(
            storage.database(),
            &Organization {
                id: "org-42".into(),
                name: "Imobiliária 42".into(),
                slug: "imob-42".into(),
                evolution_url: Some("https://evo.example".into()),
                evolution_key: Some("evo-key".into()),
                evolution_instance: Some("Vendas1".into()),
                lead_limit: 1000,
                instance_limit: 1,
                created_at: Utc::now().to_rfc3339(),
            },
        )
        .await
        .unwrap();
    }

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn handshake_echoes_challenge() {
        let (state, _storage, _dir) = test_state(None, Some("segredo")).await;
        let response = router(state)
            .oneshot(
                Request::get(
                    "/webhook?hub.mode=subscribe&hub.verify_token=segredo&hub.challenge=12345",
                )
                .body(Body::empty())
                .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "12345");
    }

    #[tokio::test]
    async fn handshake_rejects_wrong_token() {
        let (state, _storage, _dir) = test_state(None, Some("segredo")).await;
        let response = router(state)
            .oneshot(
                Request::get(
                    "/webhook?hub.mode=subscribe&hub.verify_token=errado&hub.challenge=12345",
                )
                .body(Body::empty())
                .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn handshake_rejects_when_no_token_configured() {
        let (state, _storage, _dir) = test_state(None, None).await;
        let response = router(state)
            .oneshot(
                Request::get(
                    "/webhook?hub.mode=subscribe&hub.verify_token=qualquer&hub.challenge=1",
                )
                .body(Body::empty())
                .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn bad_shared_secret_is_the_only_non_200() {
        let (state, _storage, _dir) = test_state(Some("s3cr3t"), None).await;
        let app = router(state);

        let response = app
            .clone()
            .oneshot(
                Request::post("/webhook")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .oneshot(
                Request::post("/webhook")
                    .header("X-Webhook-Secret", "s3cr3t")
                    .body(Body::from("definitely not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "IGNORED");
    }

    #[tokio::test]
    async fn non_utf8_body_is_acknowledged() {
        let (state, _storage, _dir) = test_state(None, None).await;
        let response = router(state)
            .oneshot(
                Request::post("/webhook")
                    .body(Body::from(vec![0xff, 0xfe, b'{', b'}']))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "IGNORED");
    }

    #[tokio::test]
    async fn evolution_delivery_ingests_end_to_end() {
        let (state, storage, _dir) = test_state(None, None).await;
        seed_vendas1(&storage).await;

        let payload = serde_json::json!({
            "event": "messages.upsert",
            "instance": "Vendas1",
            "data": {
                "key": {
                    "remoteJid": "5511999999999@s.whatsapp.net",
                    "fromMe": false,
                    "id": "3EB0C767D"
                },
                "pushName": "Maria",
                "message": { "conversation": "Oi" },
                "messageTimestamp": 1726000000
            }
        });
        let response = router(state)
            .oneshot(
                Request::post("/webhook")
                    .header("content-type", "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "EVENT_RECEIVED");

        let lead = queries::leads::lead_by_phone(storage.database(), "org-42", "5511999999999")
            .await
            .unwrap()
            .expect("lead created");
        assert_eq!(lead.name, "Maria");
        let log = queries::conversations::list_for_lead(storage.database(), &lead.id)
            .await
            .unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].content, "Oi");
        assert_eq!(log[0].provider, "evolution");
        assert_eq!(log[0].external_id.as_deref(), Some("3EB0C767D"));
        assert_eq!(log[0].sender_type, "contact");
    }

    #[tokio::test]
    async fn status_event_still_acknowledged() {
        let (state, storage, _dir) = test_state(None, None).await;
        seed_vendas1(&storage).await;

        let response = router(state)
            .oneshot(
                Request::post("/webhook")
                    .body(Body::from(
                        serde_json::json!({
                            "event": "connection.update",
                            "instance": "Vendas1",
                            "data": { "state": "open" }
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let events = queries::debug_events::recent_events(storage.database(), 5)
            .await
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].drop_reason.as_deref(),
            Some("parsed_zero_messages")
        );
    }
}
