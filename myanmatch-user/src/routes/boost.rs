use axum::extract::State;
use axum::Json;
use chrono::{Duration, Utc};
use diesel::prelude::*;
use serde::Serialize;
use std::sync::Arc;

use myanmatch_shared::errors::{AppError, AppResult, ErrorCode};
use myanmatch_shared::types::auth::AuthUser;
use myanmatch_shared::types::ApiResponse;

use crate::events::publisher;
use crate::models::Profile;
use crate::schema::profiles;
use crate::services::wallet;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct BoostResponse {
    pub expires_at: chrono::DateTime<Utc>,
    pub price_coins: i64,
}

/// POST /boost - debit the boost price and raise visibility until expiry
pub async fn activate_boost(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<BoostResponse>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let profile = profiles::table
        .filter(profiles::credential_id.eq(user.id))
        .first::<Profile>(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))?;

    let now = Utc::now();
    if let Some(active_until) = profile.boost_expires_at {
        if active_until > now {
            return Err(AppError::new(
                ErrorCode::BoostAlreadyActive,
                "a boost is already running",
            ));
        }
    }

    let price = state.config.boost_price_coins;
    wallet::debit_coins(
        &state.http,
        &state.config.wallet_internal_url,
        user.id,
        price,
        "profile_boost",
    )
    .await?;

    let expires_at = now + Duration::minutes(state.config.boost_window_mins);
    diesel::update(profiles::table.filter(profiles::id.eq(profile.id)))
        .set((
            profiles::boost_expires_at.eq(expires_at),
            profiles::updated_at.eq(now),
        ))
        .execute(&mut conn)?;

    publisher::publish_boost_activated(&state.rabbitmq, user.id, expires_at).await;

    tracing::info!(profile_id = %profile.id, expires_at = %expires_at, "boost activated");

    Ok(Json(ApiResponse::ok(BoostResponse {
        expires_at,
        price_coins: price,
    })))
}
