use axum::extract::{Multipart, State};
use axum::Json;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use myanmatch_shared::clients::storage::{buckets, image_ext};
use myanmatch_shared::errors::{AppError, AppResult, ErrorCode};
use myanmatch_shared::types::auth::AuthUser;
use myanmatch_shared::types::ApiResponse;

use crate::models::{tx_kind, tx_status, NewWalletTransaction, Wallet, WalletTransaction};
use crate::schema::wallet_transactions;
use crate::services::ledger;
use crate::AppState;

// --- GET /wallet ---

#[derive(Debug, Serialize)]
pub struct WalletView {
    pub wallet: Wallet,
    pub recent_transactions: Vec<WalletTransaction>,
}

pub async fn get_wallet(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<WalletView>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let wallet = ledger::get_wallet(&mut conn, user.id)?;

    let recent_transactions = wallet_transactions::table
        .filter(wallet_transactions::user_id.eq(user.id))
        .order(wallet_transactions::created_at.desc())
        .limit(20)
        .load::<WalletTransaction>(&mut conn)?;

    Ok(Json(ApiResponse::ok(WalletView {
        wallet,
        recent_transactions,
    })))
}

// --- POST /wallet/deposits --- (multipart: amount + proof image)

pub async fn create_deposit(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> AppResult<Json<ApiResponse<WalletTransaction>>> {
    let mut amount: Option<i64> = None;
    let mut proof: Option<(Vec<u8>, String)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::new(ErrorCode::ValidationError, format!("failed to read multipart: {e}"))
    })? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("amount") => {
                let text = field.text().await.map_err(|e| {
                    AppError::new(ErrorCode::ValidationError, format!("bad amount field: {e}"))
                })?;
                amount = Some(text.trim().parse::<i64>().map_err(|_| {
                    AppError::new(ErrorCode::InvalidAmount, "amount must be a whole coin count")
                })?);
            }
            Some("proof") => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field.bytes().await.map_err(|e| {
                    AppError::new(ErrorCode::ValidationError, format!("bad proof field: {e}"))
                })?;
                proof = Some((data.to_vec(), content_type));
            }
            _ => {}
        }
    }

    let amount = amount
        .ok_or_else(|| AppError::new(ErrorCode::ValidationError, "amount field is required"))?;
    ledger::ensure_positive(amount)?;

    let (data, content_type) = proof
        .ok_or_else(|| AppError::new(ErrorCode::ValidationError, "proof image is required"))?;
    let ext = image_ext(&content_type).ok_or_else(|| {
        AppError::new(
            ErrorCode::ValidationError,
            "unsupported proof format, accepted: jpeg, png, webp, gif",
        )
    })?;

    let key = format!("{}/{}.{}", user.id, Uuid::now_v7(), ext);
    let proof_url = state
        .storage
        .upload(buckets::DEPOSIT_PROOFS, &key, data, &content_type)
        .await
        .map_err(|e| AppError::internal(format!("proof upload failed: {e}")))?;

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    // A wallet must exist before money can move toward it
    ledger::get_wallet(&mut conn, user.id)?;

    let tx = diesel::insert_into(wallet_transactions::table)
        .values(&NewWalletTransaction {
            user_id: user.id,
            kind: tx_kind::DEPOSIT.to_string(),
            coin_amount: amount,
            status: tx_status::PENDING.to_string(),
            proof_url: Some(proof_url),
            payout_method: None,
            payout_address: None,
        })
        .get_result::<WalletTransaction>(&mut conn)?;

    tracing::info!(tx_id = %tx.id, user_id = %user.id, amount, "deposit submitted");

    Ok(Json(ApiResponse::ok(tx)))
}

// --- POST /wallet/withdrawals ---

#[derive(Debug, Deserialize, Validate)]
pub struct CreateWithdrawalRequest {
    pub coin_amount: i64,
    #[validate(length(min = 1, message = "payout_method is required"))]
    pub payout_method: String,
    #[validate(length(min = 1, message = "payout_address is required"))]
    pub payout_address: String,
}

pub async fn create_withdrawal(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateWithdrawalRequest>,
) -> AppResult<Json<ApiResponse<WalletTransaction>>> {
    req.validate()
        .map_err(|e| AppError::new(ErrorCode::ValidationError, e.to_string()))?;
    ledger::ensure_positive(req.coin_amount)?;

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    // Hold the coins and record the request atomically; the refund happens
    // on rejection.
    let tx = conn.transaction::<WalletTransaction, AppError, _>(|conn| {
        ledger::debit(conn, user.id, req.coin_amount)?;

        let tx = diesel::insert_into(wallet_transactions::table)
            .values(&NewWalletTransaction {
                user_id: user.id,
                kind: tx_kind::WITHDRAWAL.to_string(),
                coin_amount: req.coin_amount,
                status: tx_status::PENDING.to_string(),
                proof_url: None,
                payout_method: Some(req.payout_method.clone()),
                payout_address: Some(req.payout_address.clone()),
            })
            .get_result::<WalletTransaction>(conn)?;

        Ok(tx)
    })?;

    tracing::info!(tx_id = %tx.id, user_id = %user.id, amount = req.coin_amount, "withdrawal requested");

    Ok(Json(ApiResponse::ok(tx)))
}
