use axum::extract::{Path, State};
use axum::Json;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use myanmatch_shared::errors::{AppError, AppResult, ErrorCode};
use myanmatch_shared::types::auth::AuthUser;
use myanmatch_shared::types::{Ack, ApiResponse};

use crate::events::publisher;
use crate::models::{Like, Match, NewLike, NewMatch, Profile};
use crate::schema::{likes, matches, profiles};
use crate::services::{quota, wallet};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SendLikeRequest {
    pub to_user_id: Uuid,
    /// Legacy clients still send their own id; it must agree with the token.
    pub from_user_id: Option<Uuid>,
    pub comment: Option<String>,
    #[serde(rename = "type")]
    pub like_type: Option<String>,
    pub gift_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct SendLikeResponse {
    pub like: Like,
    pub matched: bool,
}

pub async fn send_like(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<SendLikeRequest>,
) -> AppResult<Json<ApiResponse<SendLikeResponse>>> {
    // The body identity is only ever a cross-check against the token.
    if let Some(claimed) = req.from_user_id {
        if claimed != user.id {
            return Err(AppError::new(
                ErrorCode::LikeIdentityMismatch,
                "from_user_id does not match the authenticated user",
            ));
        }
    }

    let like_type = match req.like_type.as_deref() {
        None | Some("like") => "like",
        Some("gift") => "gift",
        Some(other) => {
            return Err(AppError::new(
                ErrorCode::ValidationError,
                format!("unknown like type '{other}', expected 'like' or 'gift'"),
            ));
        }
    };

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let liker = profiles::table
        .filter(profiles::credential_id.eq(user.id))
        .first::<Profile>(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))?;

    // Target can arrive as either the profile id or the credential id
    let liked = profiles::table
        .filter(
            profiles::id.eq(req.to_user_id)
                .or(profiles::credential_id.eq(req.to_user_id)),
        )
        .first::<Profile>(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::InvalidUser, "liked profile not found"))?;

    if liked.id == liker.id {
        return Err(AppError::new(ErrorCode::CannotLikeSelf, "you cannot like yourself"));
    }
    if liked.is_blocked || !liked.onboarding_complete {
        return Err(AppError::new(ErrorCode::InvalidUser, "liked profile is unavailable"));
    }

    // One like per pair; repeats return the existing row
    let already_liked = likes::table
        .filter(likes::from_profile_id.eq(liker.id))
        .filter(likes::to_profile_id.eq(liked.id))
        .first::<Like>(&mut conn)
        .optional()?;

    if let Some(existing) = already_liked {
        let matched = pair_match(&mut conn, liker.credential_id, liked.credential_id)?.is_some();
        return Ok(Json(ApiResponse::ok(SendLikeResponse { like: existing, matched })));
    }

    // Daily quota over the fixed UTC day window
    if let Some(limit) = quota::daily_like_quota(
        &liker.membership_plan,
        state.config.free_daily_likes,
        state.config.gold_daily_likes,
    ) {
        let (day_start, day_end) = quota::utc_day_bounds(chrono::Utc::now());
        let sent_today: i64 = likes::table
            .filter(likes::from_profile_id.eq(liker.id))
            .filter(likes::created_at.ge(day_start))
            .filter(likes::created_at.lt(day_end))
            .count()
            .get_result(&mut conn)?;

        if sent_today >= limit {
            return Err(AppError::new(
                ErrorCode::DailyLikeQuotaReached,
                format!("daily like limit of {limit} reached"),
            ));
        }
    }

    // Gift likes debit coins and record ownership before the like is written
    if like_type == "gift" {
        let gift_id = req.gift_id.ok_or_else(|| {
            AppError::new(ErrorCode::ValidationError, "gift likes require a gift_id")
        })?;
        wallet::send_gift(
            &state.http,
            &state.config.wallet_internal_url,
            gift_id,
            liker.credential_id,
            liked.credential_id,
        )
        .await?;
    }

    let new_like = NewLike {
        from_profile_id: liker.id,
        to_profile_id: liked.id,
        like_type: like_type.to_string(),
        comment: req.comment.clone(),
        gift_id: req.gift_id,
    };

    let like = diesel::insert_into(likes::table)
        .values(&new_like)
        .get_result::<Like>(&mut conn)?;

    publisher::publish_like_sent(&state.rabbitmq, &like, liker.credential_id).await;

    // A reverse visible like makes this a match
    let mut matched = false;
    let reverse_like = likes::table
        .filter(likes::from_profile_id.eq(liked.id))
        .filter(likes::to_profile_id.eq(liker.id))
        .filter(likes::is_visible.eq(true))
        .first::<Like>(&mut conn)
        .optional()?;

    if reverse_like.is_some() {
        matched = true;
        if pair_match(&mut conn, liker.credential_id, liked.credential_id)?.is_none() {
            // Matches carry credential ids so downstream services can check
            // membership straight from token subjects
            let created = diesel::insert_into(matches::table)
                .values(&NewMatch::for_pair(liker.credential_id, liked.credential_id))
                .get_result::<Match>(&mut conn)?;

            publisher::publish_match_created(&state.rabbitmq, &created).await;
            tracing::info!(match_id = %created.id, "mutual like, match created");
        }
    }

    Ok(Json(ApiResponse::ok(SendLikeResponse { like, matched })))
}

fn pair_match(
    conn: &mut diesel::PgConnection,
    a: Uuid,
    b: Uuid,
) -> Result<Option<Match>, diesel::result::Error> {
    let pair = NewMatch::for_pair(a, b);
    matches::table
        .filter(matches::user_a.eq(pair.user_a))
        .filter(matches::user_b.eq(pair.user_b))
        .first::<Match>(conn)
        .optional()
}

// --- GET /likes/received ---

#[derive(Debug, Serialize)]
pub struct ReceivedLike {
    pub like: Like,
    pub from: Profile,
}

pub async fn received_likes(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Vec<ReceivedLike>>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let me = profiles::table
        .filter(profiles::credential_id.eq(user.id))
        .first::<Profile>(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))?;

    let rows: Vec<(Like, Profile)> = likes::table
        .inner_join(profiles::table.on(profiles::id.eq(likes::from_profile_id)))
        .filter(likes::to_profile_id.eq(me.id))
        .filter(likes::is_visible.eq(true))
        .order(likes::created_at.desc())
        .load::<(Like, Profile)>(&mut conn)
        .map_err(|e| AppError::internal(e.to_string()))?;

    let received = rows
        .into_iter()
        .filter(|(_, from)| !from.is_blocked)
        .map(|(like, from)| ReceivedLike { like, from })
        .collect();

    Ok(Json(ApiResponse::ok(received)))
}

// --- POST /likes/:id/hide --- (soft delete: the row stays, hidden)

pub async fn hide_like(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(like_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Ack>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let me = profiles::table
        .filter(profiles::credential_id.eq(user.id))
        .first::<Profile>(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))?;

    let updated = diesel::update(
        likes::table
            .filter(likes::id.eq(like_id))
            .filter(likes::to_profile_id.eq(me.id)),
    )
    .set(likes::is_visible.eq(false))
    .execute(&mut conn)?;

    if updated == 0 {
        return Err(AppError::new(ErrorCode::LikeNotFound, "like not found"));
    }

    Ok(Json(ApiResponse::ok(Ack::ok())))
}
