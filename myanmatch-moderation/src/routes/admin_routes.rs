use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use myanmatch_shared::clients::jwks::mint_impersonation_token;
use myanmatch_shared::errors::{AppError, AppResult, ErrorCode};
use myanmatch_shared::middleware::AdminUser;
use myanmatch_shared::types::api::ApiResponse;
use myanmatch_shared::types::pagination::{Paginated, PaginationParams};

use crate::events::publisher;
use crate::models::{
    report_status, AdminAction, Block, NewAdminAction, NewBlock, Report,
};
use crate::schema::{admin_actions, blocks, reports};
use crate::AppState;

// --- Request / Response types ---

#[derive(Debug, Deserialize)]
pub struct ReportFilterParams {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
    pub status: Option<String>,
}

fn default_page() -> u64 { 1 }
fn default_per_page() -> u64 { 20 }

impl ReportFilterParams {
    fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ReviewReportRequest {
    pub status: String, // "reviewed" or "dismissed"
    /// Block the reported user as part of the review.
    #[serde(default)]
    pub block: bool,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BlockRequest {
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct MagicLinkResponse {
    pub link: String,
    pub expires_in: i64,
}

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub pending_reports: i64,
    pub active_blocks: i64,
    pub reports_today: i64,
}

// --- List reports (paginated, optional status filter) ---

pub async fn list_reports(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(params): Query<ReportFilterParams>,
) -> AppResult<Json<ApiResponse<Paginated<Report>>>> {
    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    let pagination = params.pagination();
    let offset = pagination.offset() as i64;
    let limit = pagination.limit() as i64;

    let mut query = reports::table.into_boxed();
    let mut count_query = reports::table.into_boxed();
    if let Some(ref status) = params.status {
        query = query.filter(reports::status.eq(status));
        count_query = count_query.filter(reports::status.eq(status));
    }

    let items = query
        .order(reports::created_at.desc())
        .offset(offset)
        .limit(limit)
        .load::<Report>(&mut conn)
        .map_err(|e| AppError::internal(format!("db error: {e}")))?;

    let total: i64 = count_query
        .count()
        .get_result(&mut conn)
        .map_err(|e| AppError::internal(format!("db error: {e}")))?;

    Ok(Json(ApiResponse::ok(Paginated::new(items, total as u64, &pagination))))
}

// --- Get report details ---

pub async fn get_report(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(report_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Report>>> {
    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    let report = reports::table
        .find(report_id)
        .first::<Report>(&mut conn)
        .optional()
        .map_err(|e| AppError::internal(format!("db error: {e}")))?
        .ok_or_else(|| AppError::new(ErrorCode::ReportNotFound, "report not found"))?;

    Ok(Json(ApiResponse::ok(report)))
}

// --- Review report ---

pub async fn review_report(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Path(report_id): Path<Uuid>,
    Json(body): Json<ReviewReportRequest>,
) -> AppResult<Json<ApiResponse<Report>>> {
    if body.status != report_status::REVIEWED && body.status != report_status::DISMISSED {
        return Err(AppError::new(
            ErrorCode::ValidationError,
            "status must be 'reviewed' or 'dismissed'",
        ));
    }

    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    let report = reports::table
        .find(report_id)
        .first::<Report>(&mut conn)
        .optional()
        .map_err(|e| AppError::internal(format!("db error: {e}")))?
        .ok_or_else(|| AppError::new(ErrorCode::ReportNotFound, "report not found"))?;

    if report.status != report_status::PENDING {
        return Err(AppError::new(
            ErrorCode::ReportAlreadyReviewed,
            "this report has already been reviewed",
        ));
    }

    let updated_report: Report = diesel::update(reports::table.find(report_id))
        .set((
            reports::status.eq(&body.status),
            reports::reviewed_by.eq(admin.0.id),
            reports::reviewed_at.eq(Utc::now()),
        ))
        .get_result(&mut conn)
        .map_err(|e| AppError::internal(format!("failed to update report: {e}")))?;

    // Blocking as part of the review reuses the block path, guards included
    if body.status == report_status::REVIEWED && body.block {
        let reason = body.reason.clone().unwrap_or_else(|| report.reason.clone());
        block_user_inner(&state, &mut conn, &admin, report.reported_user_id, reason).await?;
    }

    log_admin_action(
        &mut conn,
        &admin,
        format!("review_report_{}", body.status),
        Some(report.reported_user_id),
        serde_json::json!({
            "report_id": report_id,
            "status": body.status,
            "block": body.block,
        }),
    )?;

    Ok(Json(ApiResponse::ok(updated_report)))
}

// --- Block / release ---

pub async fn block_user(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Path(user_id): Path<Uuid>,
    Json(body): Json<BlockRequest>,
) -> AppResult<Json<ApiResponse<Block>>> {
    if body.reason.trim().is_empty() {
        return Err(AppError::new(ErrorCode::ValidationError, "reason is required"));
    }

    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    let block = block_user_inner(&state, &mut conn, &admin, user_id, body.reason.clone()).await?;

    log_admin_action(
        &mut conn,
        &admin,
        "block_user".to_string(),
        Some(user_id),
        serde_json::json!({ "block_id": block.id, "reason": body.reason }),
    )?;

    Ok(Json(ApiResponse::ok(block)))
}

async fn block_user_inner(
    state: &Arc<AppState>,
    conn: &mut diesel::PgConnection,
    admin: &AdminUser,
    user_id: Uuid,
    reason: String,
) -> AppResult<Block> {
    let active: i64 = blocks::table
        .filter(blocks::user_id.eq(user_id))
        .filter(blocks::released_at.is_null())
        .count()
        .get_result(conn)
        .map_err(|e| AppError::internal(format!("db error: {e}")))?;

    if active > 0 {
        return Err(AppError::new(ErrorCode::AlreadyBlocked, "user is already blocked"));
    }

    let block: Block = diesel::insert_into(blocks::table)
        .values(&NewBlock {
            user_id,
            reason,
            blocked_by: admin.0.id,
        })
        .get_result(conn)
        .map_err(|e| AppError::internal(format!("failed to create block: {e}")))?;

    publisher::publish_user_blocked(&state.rabbitmq, &block).await;

    tracing::info!(user_id = %user_id, admin = %admin.0.id, "user blocked");

    Ok(block)
}

pub async fn release_user(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Block>>> {
    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    let active = blocks::table
        .filter(blocks::user_id.eq(user_id))
        .filter(blocks::released_at.is_null())
        .first::<Block>(&mut conn)
        .optional()
        .map_err(|e| AppError::internal(format!("db error: {e}")))?
        .ok_or_else(|| AppError::new(ErrorCode::BlockNotFound, "no active block for this user"))?;

    let released: Block = diesel::update(blocks::table.find(active.id))
        .set((
            blocks::released_at.eq(Utc::now()),
            blocks::released_by.eq(admin.0.id),
        ))
        .get_result(&mut conn)
        .map_err(|e| AppError::internal(format!("failed to release block: {e}")))?;

    publisher::publish_user_released(&state.rabbitmq, user_id, admin.0.id).await;

    log_admin_action(
        &mut conn,
        &admin,
        "release_user".to_string(),
        Some(user_id),
        serde_json::json!({ "block_id": released.id }),
    )?;

    tracing::info!(user_id = %user_id, admin = %admin.0.id, "user released");

    Ok(Json(ApiResponse::ok(released)))
}

// --- Impersonation magic link ---

pub async fn create_magic_link(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<MagicLinkResponse>>> {
    let ttl = state.config.magic_link_ttl_secs;
    let token = mint_impersonation_token(
        &state.config.impersonation_secret,
        user_id,
        admin.0.id,
        ttl,
    )?;

    let link = format!("{}#access_token={}", state.config.magic_link_base_url, token);

    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    // Impersonation is powerful; every minted link is audited
    log_admin_action(
        &mut conn,
        &admin,
        "create_magic_link".to_string(),
        Some(user_id),
        serde_json::json!({ "expires_in": ttl }),
    )?;

    tracing::info!(target = %user_id, admin = %admin.0.id, "impersonation link minted");

    Ok(Json(ApiResponse::ok(MagicLinkResponse { link, expires_in: ttl })))
}

// --- Admin user listing (via the user service's internal API) ---

pub async fn list_users(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = state
        .http
        .get(format!(
            "{}/internal/profiles?page={}&per_page={}",
            state.config.user_internal_url,
            params.page,
            params.limit(),
        ))
        .send()
        .await
        .map_err(|e| AppError::new(ErrorCode::ServiceUnavailable, format!("user service unreachable: {e}")))?;

    if !resp.status().is_success() {
        return Err(AppError::new(
            ErrorCode::ServiceUnavailable,
            format!("user service error: {}", resp.status()),
        ));
    }

    let body = resp
        .json::<serde_json::Value>()
        .await
        .map_err(|e| AppError::internal(format!("bad user listing payload: {e}")))?;

    let data = body.get("data").cloned().unwrap_or(serde_json::Value::Null);

    Ok(Json(ApiResponse::ok(data)))
}

// --- Dashboard stats ---

pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> AppResult<Json<ApiResponse<DashboardStats>>> {
    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    let pending_reports: i64 = reports::table
        .filter(reports::status.eq(report_status::PENDING))
        .count()
        .get_result(&mut conn)
        .map_err(|e| AppError::internal(format!("db error: {e}")))?;

    let active_blocks: i64 = blocks::table
        .filter(blocks::released_at.is_null())
        .count()
        .get_result(&mut conn)
        .map_err(|e| AppError::internal(format!("db error: {e}")))?;

    let today_start = Utc::now().date_naive().and_hms_opt(0, 0, 0).unwrap();
    let today_start_utc = today_start.and_utc();

    let reports_today: i64 = reports::table
        .filter(reports::created_at.ge(today_start_utc))
        .count()
        .get_result(&mut conn)
        .map_err(|e| AppError::internal(format!("db error: {e}")))?;

    Ok(Json(ApiResponse::ok(DashboardStats {
        pending_reports,
        active_blocks,
        reports_today,
    })))
}

// --- Audit log (paginated admin actions) ---

pub async fn get_audit_log(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Paginated<AdminAction>>>> {
    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    let offset = params.offset() as i64;
    let limit = params.limit() as i64;

    let items = admin_actions::table
        .order(admin_actions::created_at.desc())
        .offset(offset)
        .limit(limit)
        .load::<AdminAction>(&mut conn)
        .map_err(|e| AppError::internal(format!("db error: {e}")))?;

    let total: i64 = admin_actions::table
        .count()
        .get_result(&mut conn)
        .map_err(|e| AppError::internal(format!("db error: {e}")))?;

    Ok(Json(ApiResponse::ok(Paginated::new(items, total as u64, &params))))
}

// --- Helper: append to the audit log ---

fn log_admin_action(
    conn: &mut diesel::PgConnection,
    admin: &AdminUser,
    action: String,
    target_user_id: Option<Uuid>,
    details: serde_json::Value,
) -> AppResult<()> {
    diesel::insert_into(admin_actions::table)
        .values(&NewAdminAction {
            admin_id: admin.0.id,
            action,
            target_user_id,
            details: Some(details),
        })
        .execute(conn)
        .map_err(|e| AppError::internal(format!("failed to log admin action: {e}")))?;

    Ok(())
}
