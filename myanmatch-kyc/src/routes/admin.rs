use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use myanmatch_shared::errors::{AppError, AppResult, ErrorCode};
use myanmatch_shared::middleware::AdminUser;
use myanmatch_shared::types::{ApiResponse, Paginated};
use myanmatch_shared::types::pagination::PaginationParams;

use crate::events::publisher;
use crate::models::{kyc_status, KycRequest};
use crate::schema::kyc_requests;
use crate::services::{snapshot, user_client};
use crate::AppState;

// --- GET /admin/kyc ---

#[derive(Debug, Deserialize)]
pub struct KycFilterParams {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
    pub status: Option<String>,
}

fn default_page() -> u64 { 1 }
fn default_per_page() -> u64 { 20 }

pub async fn list_requests(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(params): Query<KycFilterParams>,
) -> AppResult<Json<ApiResponse<Paginated<KycRequest>>>> {
    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    let pagination = PaginationParams {
        page: params.page,
        per_page: params.per_page,
    };
    let offset = pagination.offset() as i64;
    let limit = pagination.limit() as i64;

    let status = params.status.unwrap_or_else(|| kyc_status::PENDING.to_string());

    let items = kyc_requests::table
        .filter(kyc_requests::status.eq(&status))
        .order(kyc_requests::created_at.asc())
        .offset(offset)
        .limit(limit)
        .load::<KycRequest>(&mut conn)
        .map_err(|e| AppError::internal(format!("db error: {e}")))?;

    let total: i64 = kyc_requests::table
        .filter(kyc_requests::status.eq(&status))
        .count()
        .get_result(&mut conn)
        .map_err(|e| AppError::internal(format!("db error: {e}")))?;

    Ok(Json(ApiResponse::ok(Paginated::new(items, total as u64, &pagination))))
}

// --- POST /admin/kyc/:id/decision ---

#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    pub approve: bool,
    pub reason: Option<String>,
}

pub async fn decide_request(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Path(request_id): Path<Uuid>,
    Json(body): Json<DecisionRequest>,
) -> AppResult<Json<ApiResponse<KycRequest>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let request = kyc_requests::table
        .find(request_id)
        .first::<KycRequest>(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::KycRequestNotFound, "request not found"))?;

    if request.status != kyc_status::PENDING {
        return Err(AppError::new(
            ErrorCode::KycAlreadyDecided,
            format!("request is already {}", request.status),
        ));
    }

    if !body.approve {
        let denied = mark_decided(
            &mut conn,
            request_id,
            kyc_status::DENIED,
            admin.0.id,
            body.reason.clone(),
        )?;
        publisher::publish_kyc_decided(&state.rabbitmq, &denied, false).await;
        tracing::info!(request_id = %request_id, admin = %admin.0.id, "kyc denied");
        return Ok(Json(ApiResponse::ok(denied)));
    }

    // Anti-spoofing: the avatar must not have changed since submission
    let profile =
        user_client::fetch_profile(&state.http, &state.config.user_internal_url, request.user_id)
            .await?;
    let live_avatar = profile.avatar_url().unwrap_or_default();

    if !snapshot::hashes_match(&request.avatar_snapshot_hash, live_avatar) {
        let denied = mark_decided(
            &mut conn,
            request_id,
            kyc_status::DENIED,
            admin.0.id,
            Some("profile photo changed after submission".to_string()),
        )?;
        publisher::publish_kyc_decided(&state.rabbitmq, &denied, false).await;
        tracing::warn!(request_id = %request_id, "kyc denied: avatar snapshot mismatch");
        return Err(AppError::new(
            ErrorCode::AvatarMismatch,
            "profile photo changed after submission; request denied",
        ));
    }

    user_client::mark_verified(&state.http, &state.config.user_internal_url, request.user_id)
        .await?;

    let approved = mark_decided(&mut conn, request_id, kyc_status::APPROVED, admin.0.id, None)?;
    publisher::publish_kyc_decided(&state.rabbitmq, &approved, true).await;

    tracing::info!(request_id = %request_id, admin = %admin.0.id, "kyc approved");

    Ok(Json(ApiResponse::ok(approved)))
}

fn mark_decided(
    conn: &mut diesel::PgConnection,
    request_id: Uuid,
    status: &str,
    admin_id: Uuid,
    denial_reason: Option<String>,
) -> AppResult<KycRequest> {
    let updated = diesel::update(kyc_requests::table.find(request_id))
        .set((
            kyc_requests::status.eq(status),
            kyc_requests::decided_by.eq(admin_id),
            kyc_requests::decided_at.eq(Utc::now()),
            kyc_requests::denial_reason.eq(denial_reason),
        ))
        .get_result::<KycRequest>(conn)?;
    Ok(updated)
}
