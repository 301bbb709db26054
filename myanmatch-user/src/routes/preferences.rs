use axum::extract::State;
use axum::Json;
use diesel::prelude::*;
use std::sync::Arc;

use myanmatch_shared::errors::{AppError, AppResult, ErrorCode};
use myanmatch_shared::types::auth::AuthUser;
use myanmatch_shared::types::ApiResponse;

use crate::models::{NewPreferences, Preferences, Profile, UpdatePreferences};
use crate::schema::{preferences, profiles};
use crate::AppState;

fn load_own_profile(
    conn: &mut diesel::PgConnection,
    user: &AuthUser,
) -> AppResult<Profile> {
    profiles::table
        .filter(profiles::credential_id.eq(user.id))
        .first::<Profile>(conn)
        .map_err(|_| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))
}

// --- GET /preferences ---

pub async fn get_preferences(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Preferences>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    let profile = load_own_profile(&mut conn, &user)?;

    // The row is created with the profile; recreate it if it is somehow gone.
    let prefs = match preferences::table
        .filter(preferences::profile_id.eq(profile.id))
        .first::<Preferences>(&mut conn)
        .optional()?
    {
        Some(p) => p,
        None => diesel::insert_into(preferences::table)
            .values(&NewPreferences { profile_id: profile.id })
            .get_result::<Preferences>(&mut conn)?,
    };

    Ok(Json(ApiResponse::ok(prefs)))
}

// --- PUT /preferences ---

pub async fn update_preferences(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<UpdatePreferences>,
) -> AppResult<Json<ApiResponse<Preferences>>> {
    if let (Some(min), Some(max)) = (payload.age_min, payload.age_max) {
        if min > max {
            return Err(AppError::new(
                ErrorCode::ValidationError,
                "age_min cannot exceed age_max",
            ));
        }
    }
    if let Some(min) = payload.age_min {
        if min < 18 {
            return Err(AppError::new(ErrorCode::ValidationError, "age_min must be at least 18"));
        }
    }

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;
    let profile = load_own_profile(&mut conn, &user)?;

    let updated = diesel::update(preferences::table.filter(preferences::profile_id.eq(profile.id)))
        .set((
            &payload,
            preferences::updated_at.eq(chrono::Utc::now()),
        ))
        .get_result::<Preferences>(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::PreferencesNotFound, "preferences not found"))?;

    Ok(Json(ApiResponse::ok(updated)))
}
