use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use myanmatch_shared::errors::AppResult;
use myanmatch_shared::types::auth::AuthUser;
use myanmatch_shared::types::event::{payloads, routing_keys, Event};

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: MeUser,
}

#[derive(Debug, Serialize)]
pub struct MeUser {
    pub id: Uuid,
    pub email: Option<String>,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impersonated_by: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<serde_json::Value>,
}

/// GET /api/auth/me - `{ user }` for a valid token, 401 otherwise (the
/// `AuthUser` extractor rejects before this body runs).
///
/// The first sighting of a subject with no profile publishes
/// `auth.user.registered`, which fans out into profile and wallet creation.
pub async fn me(user: AuthUser, State(state): State<Arc<AppState>>) -> AppResult<Json<MeResponse>> {
    let profile = fetch_profile(&state, user.id).await;

    if profile.is_none() {
        let event = Event::new(
            "myanmatch-gateway",
            routing_keys::AUTH_USER_REGISTERED,
            payloads::UserRegistered {
                credential_id: user.id,
                email: user.email.clone(),
            },
        )
        .with_user(user.id);

        if let Err(e) = state
            .rabbitmq
            .publish(routing_keys::AUTH_USER_REGISTERED, &event)
            .await
        {
            tracing::error!(error = %e, "failed to publish user.registered event");
        } else {
            tracing::info!(credential_id = %user.id, "new subject, user.registered published");
        }
    }

    Ok(Json(MeResponse {
        user: MeUser {
            id: user.id,
            email: user.email,
            role: user.role.to_string(),
            impersonated_by: user.impersonated_by,
            profile,
        },
    }))
}

async fn fetch_profile(state: &Arc<AppState>, user_id: Uuid) -> Option<serde_json::Value> {
    let resp = state
        .http_client
        .get(format!("{}/internal/profiles/{}", state.config.user_url, user_id))
        .send()
        .await
        .ok()?;

    if !resp.status().is_success() {
        return None;
    }

    let body = resp.json::<serde_json::Value>().await.ok()?;
    body.get("data").cloned()
}
