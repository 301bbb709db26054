use axum::extract::{Multipart, Path, Query, State};
use axum::Json;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use myanmatch_shared::clients::storage::{buckets, image_ext};
use myanmatch_shared::errors::{AppError, AppResult, ErrorCode};
use myanmatch_shared::middleware::AdminUser;
use myanmatch_shared::types::{ApiResponse, Paginated};
use myanmatch_shared::types::pagination::PaginationParams;

use crate::events::publisher;
use crate::models::{Gift, NewGift, UpdateGift, WalletTransaction};
use crate::schema::{gifts_catalog, wallet_transactions};
use crate::services::ledger;
use crate::AppState;

// --- GET /admin/wallet/transactions ---

#[derive(Debug, Deserialize)]
pub struct TransactionFilterParams {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
    pub status: Option<String>,
    pub kind: Option<String>,
}

fn default_page() -> u64 { 1 }
fn default_per_page() -> u64 { 20 }

impl TransactionFilterParams {
    fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(params): Query<TransactionFilterParams>,
) -> AppResult<Json<ApiResponse<Paginated<WalletTransaction>>>> {
    let mut conn = state.db.get()
        .map_err(|e| AppError::internal(format!("db pool error: {e}")))?;

    let pagination = params.pagination();
    let offset = pagination.offset() as i64;
    let limit = pagination.limit() as i64;

    let mut query = wallet_transactions::table.into_boxed();
    let mut count_query = wallet_transactions::table.into_boxed();

    if let Some(ref status) = params.status {
        query = query.filter(wallet_transactions::status.eq(status));
        count_query = count_query.filter(wallet_transactions::status.eq(status));
    }
    if let Some(ref kind) = params.kind {
        query = query.filter(wallet_transactions::kind.eq(kind));
        count_query = count_query.filter(wallet_transactions::kind.eq(kind));
    }

    let items = query
        .order(wallet_transactions::created_at.desc())
        .offset(offset)
        .limit(limit)
        .load::<WalletTransaction>(&mut conn)
        .map_err(|e| AppError::internal(format!("db error: {e}")))?;

    let total: i64 = count_query
        .count()
        .get_result(&mut conn)
        .map_err(|e| AppError::internal(format!("db error: {e}")))?;

    Ok(Json(ApiResponse::ok(Paginated::new(items, total as u64, &pagination))))
}

// --- Decision transitions (each valid only from `pending`) ---

pub async fn approve_deposit(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Path(tx_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<WalletTransaction>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let tx = ledger::approve_deposit(&mut conn, tx_id, admin.0.id)?;
    publisher::publish_transaction_decided(&state.rabbitmq, &tx, true).await;

    tracing::info!(tx_id = %tx.id, admin = %admin.0.id, "deposit approved");
    Ok(Json(ApiResponse::ok(tx)))
}

pub async fn reject_deposit(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Path(tx_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<WalletTransaction>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let tx = ledger::reject_deposit(&mut conn, tx_id, admin.0.id)?;
    publisher::publish_transaction_decided(&state.rabbitmq, &tx, false).await;

    tracing::info!(tx_id = %tx.id, admin = %admin.0.id, "deposit rejected");
    Ok(Json(ApiResponse::ok(tx)))
}

pub async fn approve_withdrawal(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Path(tx_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<WalletTransaction>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let tx = ledger::approve_withdrawal(&mut conn, tx_id, admin.0.id)?;
    publisher::publish_transaction_decided(&state.rabbitmq, &tx, true).await;

    tracing::info!(tx_id = %tx.id, admin = %admin.0.id, "withdrawal approved");
    Ok(Json(ApiResponse::ok(tx)))
}

pub async fn reject_withdrawal(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Path(tx_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<WalletTransaction>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let tx = ledger::reject_withdrawal(&mut conn, tx_id, admin.0.id)?;
    publisher::publish_transaction_decided(&state.rabbitmq, &tx, false).await;

    tracing::info!(tx_id = %tx.id, admin = %admin.0.id, "withdrawal rejected, coins refunded");
    Ok(Json(ApiResponse::ok(tx)))
}

// --- Gift catalog management ---

pub async fn create_gift(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Json(body): Json<NewGift>,
) -> AppResult<Json<ApiResponse<Gift>>> {
    if body.name.trim().is_empty() {
        return Err(AppError::new(ErrorCode::ValidationError, "gift name is required"));
    }
    ledger::ensure_positive(body.price_coins)?;

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let gift = diesel::insert_into(gifts_catalog::table)
        .values(&body)
        .get_result::<Gift>(&mut conn)?;

    Ok(Json(ApiResponse::ok(gift)))
}

pub async fn update_gift(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(gift_id): Path<Uuid>,
    Json(body): Json<UpdateGift>,
) -> AppResult<Json<ApiResponse<Gift>>> {
    if let Some(price) = body.price_coins {
        ledger::ensure_positive(price)?;
    }

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let gift = diesel::update(gifts_catalog::table.find(gift_id))
        .set(&body)
        .get_result::<Gift>(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::GiftNotFound, "gift not found"))?;

    Ok(Json(ApiResponse::ok(gift)))
}

pub async fn upload_gift_image(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(gift_id): Path<Uuid>,
    mut multipart: Multipart,
) -> AppResult<Json<ApiResponse<Gift>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    gifts_catalog::table
        .find(gift_id)
        .first::<Gift>(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::GiftNotFound, "gift not found"))?;

    let field = multipart
        .next_field()
        .await
        .map_err(|e| AppError::new(ErrorCode::ValidationError, format!("failed to read multipart: {e}")))?
        .ok_or_else(|| AppError::new(ErrorCode::ValidationError, "no image provided"))?;

    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    let ext = image_ext(&content_type).ok_or_else(|| {
        AppError::new(
            ErrorCode::ValidationError,
            "unsupported image format, accepted: jpeg, png, webp, gif",
        )
    })?;

    let data = field
        .bytes()
        .await
        .map_err(|e| AppError::new(ErrorCode::ValidationError, format!("failed to read image: {e}")))?;

    let key = format!("{}.{}", gift_id, ext);
    let image_url = state
        .storage
        .upload(buckets::GIFT_IMAGES, &key, data.to_vec(), &content_type)
        .await
        .map_err(|e| AppError::internal(format!("image upload failed: {e}")))?;

    let gift = diesel::update(gifts_catalog::table.find(gift_id))
        .set(gifts_catalog::image_url.eq(&image_url))
        .get_result::<Gift>(&mut conn)?;

    Ok(Json(ApiResponse::ok(gift)))
}
