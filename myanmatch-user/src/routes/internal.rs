use axum::extract::{Path, Query, State};
use axum::Json;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use myanmatch_shared::errors::{AppError, AppResult, ErrorCode};
use myanmatch_shared::types::{Ack, ApiResponse, Paginated, PaginationParams};

use crate::models::Profile;
use crate::schema::profiles;
use crate::AppState;

// Service-to-service endpoints; reachable only on the internal network,
// never proxied by the gateway.

/// GET /internal/profiles/:id (profile id or credential id)
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Profile>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let profile = profiles::table
        .filter(profiles::credential_id.eq(id).or(profiles::id.eq(id)))
        .first::<Profile>(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))?;

    Ok(Json(ApiResponse::ok(profile)))
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub ids: Vec<Uuid>,
}

/// POST /internal/profiles/batch
pub async fn batch_profiles(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BatchRequest>,
) -> AppResult<Json<ApiResponse<Vec<Profile>>>> {
    if req.ids.is_empty() {
        return Ok(Json(ApiResponse::ok(vec![])));
    }

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let found = profiles::table
        .filter(
            profiles::credential_id.eq_any(&req.ids).or(profiles::id.eq_any(&req.ids)),
        )
        .load::<Profile>(&mut conn)
        .map_err(|e| AppError::internal(e.to_string()))?;

    Ok(Json(ApiResponse::ok(found)))
}

/// GET /internal/profiles?page=&per_page= (admin user listing)
pub async fn list_profiles(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Paginated<Profile>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let offset = params.offset() as i64;
    let limit = params.limit() as i64;

    let items = profiles::table
        .order(profiles::created_at.desc())
        .offset(offset)
        .limit(limit)
        .load::<Profile>(&mut conn)
        .map_err(|e| AppError::internal(e.to_string()))?;

    let total: i64 = profiles::table
        .count()
        .get_result(&mut conn)
        .map_err(|e| AppError::internal(e.to_string()))?;

    Ok(Json(ApiResponse::ok(Paginated::new(items, total as u64, &params))))
}

/// POST /internal/verify/:credential_id (KYC approval side effect)
pub async fn mark_verified(
    State(state): State<Arc<AppState>>,
    Path(credential_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Ack>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let updated = diesel::update(profiles::table.filter(profiles::credential_id.eq(credential_id)))
        .set((
            profiles::is_verified.eq(true),
            profiles::updated_at.eq(chrono::Utc::now()),
        ))
        .execute(&mut conn)?;

    if updated == 0 {
        return Err(AppError::new(ErrorCode::ProfileNotFound, "profile not found"));
    }

    tracing::info!(credential_id = %credential_id, "profile marked verified");

    Ok(Json(ApiResponse::ok(Ack::ok())))
}
