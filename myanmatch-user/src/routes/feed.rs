use axum::extract::{Query, State};
use axum::Json;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;

use myanmatch_shared::errors::{AppError, AppResult, ErrorCode};
use myanmatch_shared::types::auth::AuthUser;
use myanmatch_shared::types::ApiResponse;

use crate::feed::eligibility::{self, Viewer};
use crate::models::{Preferences, Profile};
use crate::schema::{likes, passes, preferences, profiles};
use crate::AppState;

/// How many rows the candidate query pulls before the in-memory filter runs.
const CANDIDATE_POOL_SIZE: i64 = 500;

#[derive(Deserialize)]
pub struct FeedParams {
    #[serde(default = "default_limit")]
    limit: i64,
}

fn default_limit() -> i64 {
    20
}

/// GET /feed?limit=20
///
/// Pulls a candidate pool, applies the eligibility predicate and ordering in
/// memory, and returns the top slice.
pub async fn get_feed(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(params): Query<FeedParams>,
) -> AppResult<Json<ApiResponse<Vec<Profile>>>> {
    let limit = params.limit.clamp(1, 50) as usize;
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let viewer_profile = profiles::table
        .filter(profiles::credential_id.eq(user.id))
        .first::<Profile>(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))?;

    if !viewer_profile.onboarding_complete {
        return Err(AppError::new(
            ErrorCode::OnboardingIncomplete,
            "finish onboarding before browsing",
        ));
    }

    let prefs = preferences::table
        .filter(preferences::profile_id.eq(viewer_profile.id))
        .first::<Preferences>(&mut conn)
        .optional()?
        .unwrap_or_else(|| Preferences::permissive(viewer_profile.id));

    let liked_ids = likes::table
        .filter(likes::from_profile_id.eq(viewer_profile.id))
        .select(likes::to_profile_id);
    let passed_ids = passes::table
        .filter(passes::from_profile_id.eq(viewer_profile.id))
        .select(passes::to_profile_id);

    let mut candidates = profiles::table
        .filter(profiles::id.ne(viewer_profile.id))
        .filter(profiles::onboarding_complete.eq(true))
        .filter(profiles::is_blocked.eq(false))
        .filter(profiles::id.ne_all(liked_ids))
        .filter(profiles::id.ne_all(passed_ids))
        .order(profiles::last_seen_at.desc().nulls_last())
        .limit(CANDIDATE_POOL_SIZE)
        .load::<Profile>(&mut conn)
        .map_err(|e| AppError::internal(e.to_string()))?;

    let now = chrono::Utc::now();
    let today = now.date_naive();
    let viewer = Viewer::of(&viewer_profile, today);

    candidates.retain(|c| eligibility::is_eligible(c, &prefs, today));
    eligibility::rank(&mut candidates, &viewer, now);
    candidates.truncate(limit);

    Ok(Json(ApiResponse::ok(candidates)))
}
