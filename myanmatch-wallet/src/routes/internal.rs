use axum::extract::State;
use axum::Json;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use myanmatch_shared::errors::{AppError, AppResult, ErrorCode};
use myanmatch_shared::types::ApiResponse;

use crate::events::publisher;
use crate::models::{gift_status, Gift, NewUserGift, UserGift};
use crate::schema::{gifts_catalog, user_gifts};
use crate::services::ledger;
use crate::AppState;

// Service-to-service endpoints; reachable only on the internal network.

#[derive(Debug, Deserialize)]
pub struct CoinMovementRequest {
    pub user_id: Uuid,
    pub amount: i64,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub coin_balance: i64,
}

/// POST /internal/coins/debit
pub async fn debit_coins(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CoinMovementRequest>,
) -> AppResult<Json<ApiResponse<BalanceResponse>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let coin_balance = ledger::debit(&mut conn, req.user_id, req.amount)?;

    tracing::info!(
        user_id = %req.user_id,
        amount = req.amount,
        reason = %req.reason,
        "coins debited"
    );

    Ok(Json(ApiResponse::ok(BalanceResponse { coin_balance })))
}

/// POST /internal/coins/credit
pub async fn credit_coins(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CoinMovementRequest>,
) -> AppResult<Json<ApiResponse<BalanceResponse>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let coin_balance = ledger::credit(&mut conn, req.user_id, req.amount)?;

    tracing::info!(
        user_id = %req.user_id,
        amount = req.amount,
        reason = %req.reason,
        "coins credited"
    );

    Ok(Json(ApiResponse::ok(BalanceResponse { coin_balance })))
}

#[derive(Debug, Deserialize)]
pub struct SendGiftRequest {
    pub gift_id: Uuid,
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
}

/// POST /internal/gifts/send - debit the sender and record ownership, used
/// by gift-type likes in the user service.
pub async fn send_gift(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SendGiftRequest>,
) -> AppResult<Json<ApiResponse<UserGift>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let (user_gift, price) = conn.transaction::<(UserGift, i64), AppError, _>(|conn| {
        let gift = gifts_catalog::table
            .find(req.gift_id)
            .first::<Gift>(conn)
            .optional()?
            .ok_or_else(|| AppError::new(ErrorCode::GiftNotFound, "gift not found"))?;

        if !gift.is_active {
            return Err(AppError::new(ErrorCode::GiftNotActive, "gift is not available"));
        }

        ledger::debit(conn, req.from_user_id, gift.price_coins)?;

        let user_gift = diesel::insert_into(user_gifts::table)
            .values(&NewUserGift {
                gift_id: gift.id,
                from_user_id: req.from_user_id,
                to_user_id: req.to_user_id,
                status: gift_status::SENT.to_string(),
            })
            .get_result::<UserGift>(conn)?;

        Ok((user_gift, gift.price_coins))
    })?;

    publisher::publish_gift_sent(&state.rabbitmq, &user_gift, price).await;

    tracing::info!(
        user_gift_id = %user_gift.id,
        from = %req.from_user_id,
        to = %req.to_user_id,
        price,
        "gift sent"
    );

    Ok(Json(ApiResponse::ok(user_gift)))
}
