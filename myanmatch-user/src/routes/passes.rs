use axum::extract::State;
use axum::Json;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use myanmatch_shared::errors::{AppError, AppResult, ErrorCode};
use myanmatch_shared::types::auth::AuthUser;
use myanmatch_shared::types::{Ack, ApiResponse};

use crate::models::{NewPass, Pass, Profile};
use crate::schema::{passes, profiles};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SendPassRequest {
    pub to_user_id: Uuid,
}

/// POST /passes - record a skip so the profile stays out of future feeds
pub async fn send_pass(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<SendPassRequest>,
) -> AppResult<Json<ApiResponse<Ack>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let me = profiles::table
        .filter(profiles::credential_id.eq(user.id))
        .first::<Profile>(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))?;

    let target = profiles::table
        .filter(
            profiles::id.eq(req.to_user_id)
                .or(profiles::credential_id.eq(req.to_user_id)),
        )
        .first::<Profile>(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::InvalidUser, "passed profile not found"))?;

    if target.id == me.id {
        return Err(AppError::new(ErrorCode::ValidationError, "you cannot pass yourself"));
    }

    let existing = passes::table
        .filter(passes::from_profile_id.eq(me.id))
        .filter(passes::to_profile_id.eq(target.id))
        .first::<Pass>(&mut conn)
        .optional()?;

    if existing.is_none() {
        diesel::insert_into(passes::table)
            .values(&NewPass {
                from_profile_id: me.id,
                to_profile_id: target.id,
            })
            .execute(&mut conn)?;
    }

    Ok(Json(ApiResponse::ok(Ack::ok())))
}
