use axum::extract::State;
use axum::Json;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use myanmatch_shared::errors::{AppError, AppResult, ErrorCode};
use myanmatch_shared::types::auth::AuthUser;
use myanmatch_shared::types::ApiResponse;

use crate::events::publisher;
use crate::models::{gift_status, Gift, NewSwap, Swap, UserGift};
use crate::schema::{gifts_catalog, swaps, user_gifts};
use crate::services::ledger;
use crate::AppState;

// --- GET /market/gifts ---

pub async fn list_gifts(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<Gift>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let gifts = gifts_catalog::table
        .filter(gifts_catalog::is_active.eq(true))
        .order(gifts_catalog::price_coins.asc())
        .load::<Gift>(&mut conn)?;

    Ok(Json(ApiResponse::ok(gifts)))
}

// --- GET /market/gifts/received ---

#[derive(Debug, Serialize)]
pub struct ReceivedGift {
    pub user_gift: UserGift,
    pub gift: Gift,
}

pub async fn received_gifts(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<ReceivedGift>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let rows: Vec<(UserGift, Gift)> = user_gifts::table
        .inner_join(gifts_catalog::table)
        .filter(user_gifts::to_user_id.eq(user.id))
        .order(user_gifts::created_at.desc())
        .load::<(UserGift, Gift)>(&mut conn)?;

    let received = rows
        .into_iter()
        .map(|(user_gift, gift)| ReceivedGift { user_gift, gift })
        .collect();

    Ok(Json(ApiResponse::ok(received)))
}

// --- POST /market/swaps --- (convert a received gift back to coins)

#[derive(Debug, Deserialize)]
pub struct CreateSwapRequest {
    pub user_gift_id: Uuid,
}

pub async fn create_swap(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateSwapRequest>,
) -> AppResult<Json<ApiResponse<Swap>>> {
    let rate = state.config.swap_rate_percent;
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let swap = conn.transaction::<Swap, AppError, _>(|conn| {
        let user_gift = user_gifts::table
            .find(req.user_gift_id)
            .for_update()
            .first::<UserGift>(conn)
            .optional()?
            .ok_or_else(|| AppError::new(ErrorCode::GiftNotFound, "gift not found"))?;

        if user_gift.to_user_id != user.id {
            return Err(AppError::new(
                ErrorCode::GiftNotReceived,
                "only the receiver can swap a gift",
            ));
        }
        if user_gift.status != gift_status::SENT {
            return Err(AppError::new(
                ErrorCode::GiftAlreadySwapped,
                "this gift has already been swapped",
            ));
        }

        let gift = gifts_catalog::table
            .find(user_gift.gift_id)
            .first::<Gift>(conn)?;

        // Even the cheapest gift pays back at least one coin
        let payout = ledger::swap_payout(gift.price_coins, rate).max(1);

        diesel::update(user_gifts::table.find(user_gift.id))
            .set(user_gifts::status.eq(gift_status::SWAPPED))
            .execute(conn)?;

        ledger::credit(conn, user.id, payout)?;

        let swap = diesel::insert_into(swaps::table)
            .values(&NewSwap {
                user_gift_id: user_gift.id,
                user_id: user.id,
                coin_amount: payout,
            })
            .get_result::<Swap>(conn)?;

        Ok(swap)
    })?;

    publisher::publish_gift_swapped(&state.rabbitmq, &swap).await;

    tracing::info!(
        swap_id = %swap.id,
        user_id = %user.id,
        coins = swap.coin_amount,
        "gift swapped for coins"
    );

    Ok(Json(ApiResponse::ok(swap)))
}
