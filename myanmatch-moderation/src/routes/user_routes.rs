use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use myanmatch_shared::errors::{AppError, AppResult, ErrorCode};
use myanmatch_shared::types::auth::AuthUser;
use myanmatch_shared::types::Ack;

use crate::events::publisher;
use crate::models::{report_status, NewReport, Report};
use crate::schema::reports;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateReportRequest {
    pub reported_user_id: Uuid,
    pub reason: String,
    pub details: Option<String>,
}

/// POST /report
///
/// The reporter identity comes from the verified token. The legacy
/// `X-User-Id` header is accepted only as a cross-check; a mismatch is
/// rejected rather than trusted.
pub async fn create_report(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    headers: HeaderMap,
    Json(body): Json<CreateReportRequest>,
) -> AppResult<Json<Ack>> {
    if let Some(claimed) = headers.get("X-User-Id").and_then(|v| v.to_str().ok()) {
        let claimed = Uuid::parse_str(claimed)
            .map_err(|_| AppError::new(ErrorCode::ValidationError, "invalid X-User-Id header"))?;
        if claimed != auth.id {
            return Err(AppError::new(
                ErrorCode::Forbidden,
                "X-User-Id does not match the authenticated user",
            ));
        }
    }

    if body.reason.trim().is_empty() {
        return Err(AppError::new(ErrorCode::ValidationError, "reason is required"));
    }

    if auth.id == body.reported_user_id {
        return Err(AppError::new(ErrorCode::CannotReportSelf, "you cannot report yourself"));
    }

    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    // One pending report per reporter/target pair
    let existing: i64 = reports::table
        .filter(reports::reporter_id.eq(auth.id))
        .filter(reports::reported_user_id.eq(body.reported_user_id))
        .filter(reports::status.eq(report_status::PENDING))
        .count()
        .get_result(&mut conn)
        .map_err(|e| AppError::internal(format!("db error: {e}")))?;

    if existing > 0 {
        return Err(AppError::new(
            ErrorCode::DuplicateReport,
            "you already have a pending report against this user",
        ));
    }

    let report: Report = diesel::insert_into(reports::table)
        .values(&NewReport {
            reporter_id: auth.id,
            reported_user_id: body.reported_user_id,
            reason: body.reason.trim().to_string(),
            details: body.details,
        })
        .get_result(&mut conn)
        .map_err(|e| AppError::internal(format!("failed to create report: {e}")))?;

    publisher::publish_report_created(&state.rabbitmq, &report).await;

    tracing::info!(report_id = %report.id, reporter = %auth.id, "report created");

    // The original surface returned a bare `{ ok: true }` here
    Ok(Json(Ack::ok()))
}
