use axum::extract::{Multipart, State};
use axum::Json;
use diesel::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

use myanmatch_shared::clients::storage::{buckets, image_ext};
use myanmatch_shared::errors::{AppError, AppResult, ErrorCode};
use myanmatch_shared::types::auth::AuthUser;
use myanmatch_shared::types::ApiResponse;

use crate::models::{kyc_status, KycRequest, NewKycRequest};
use crate::schema::kyc_requests;
use crate::services::{snapshot, user_client};
use crate::AppState;

// --- POST /kyc --- (multipart: selfie_front + selfie_holding)

pub async fn submit_request(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> AppResult<Json<ApiResponse<KycRequest>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let pending_exists: i64 = kyc_requests::table
        .filter(kyc_requests::user_id.eq(user.id))
        .filter(kyc_requests::status.eq(kyc_status::PENDING))
        .count()
        .get_result(&mut conn)?;

    if pending_exists > 0 {
        return Err(AppError::new(
            ErrorCode::KycAlreadyPending,
            "a verification request is already under review",
        ));
    }

    // Snapshot of the live avatar: the anti-spoofing anchor for the review
    let profile = user_client::fetch_profile(&state.http, &state.config.user_internal_url, user.id).await?;
    let avatar_url = profile.avatar_url().ok_or_else(|| {
        AppError::new(
            ErrorCode::ValidationError,
            "add a profile photo before requesting verification",
        )
    })?;
    let avatar_snapshot_hash = snapshot::avatar_hash(avatar_url);

    let mut selfie_front: Option<(Vec<u8>, String)> = None;
    let mut selfie_holding: Option<(Vec<u8>, String)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::new(ErrorCode::ValidationError, format!("failed to read multipart: {e}"))
    })? {
        let name = field.name().map(str::to_string);
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field.bytes().await.map_err(|e| {
            AppError::new(ErrorCode::ValidationError, format!("failed to read selfie: {e}"))
        })?;

        match name.as_deref() {
            Some("selfie_front") => selfie_front = Some((data.to_vec(), content_type)),
            Some("selfie_holding") => selfie_holding = Some((data.to_vec(), content_type)),
            _ => {}
        }
    }

    let selfie_front = selfie_front.ok_or_else(|| {
        AppError::new(ErrorCode::SelfieMissing, "selfie_front is required")
    })?;
    let selfie_holding = selfie_holding.ok_or_else(|| {
        AppError::new(ErrorCode::SelfieMissing, "selfie_holding is required")
    })?;

    let selfie_front_url = upload_selfie(&state, user.id, "front", selfie_front).await?;
    let selfie_holding_url = upload_selfie(&state, user.id, "holding", selfie_holding).await?;

    let request = diesel::insert_into(kyc_requests::table)
        .values(&NewKycRequest {
            user_id: user.id,
            selfie_front_url,
            selfie_holding_url,
            avatar_snapshot_hash,
            status: kyc_status::PENDING.to_string(),
        })
        .get_result::<KycRequest>(&mut conn)?;

    tracing::info!(request_id = %request.id, user_id = %user.id, "kyc request submitted");

    Ok(Json(ApiResponse::ok(request)))
}

async fn upload_selfie(
    state: &Arc<AppState>,
    user_id: Uuid,
    kind: &str,
    (data, content_type): (Vec<u8>, String),
) -> AppResult<String> {
    let ext = image_ext(&content_type).ok_or_else(|| {
        AppError::new(
            ErrorCode::ValidationError,
            "unsupported selfie format, accepted: jpeg, png, webp, gif",
        )
    })?;

    let key = format!("{}/{}-{}.{}", user_id, kind, Uuid::now_v7(), ext);
    state
        .storage
        .upload(buckets::KYC, &key, data, &content_type)
        .await
        .map_err(|e| AppError::internal(format!("selfie upload failed: {e}")))
}

// --- GET /kyc/status ---

pub async fn get_status(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Option<KycRequest>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let latest = kyc_requests::table
        .filter(kyc_requests::user_id.eq(user.id))
        .order(kyc_requests::created_at.desc())
        .first::<KycRequest>(&mut conn)
        .optional()?;

    Ok(Json(ApiResponse::ok(latest)))
}
