use axum::extract::{Path, State};
use axum::Json;
use chrono::NaiveDate;
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use myanmatch_shared::errors::{AppError, AppResult, ErrorCode};
use myanmatch_shared::types::auth::AuthUser;
use myanmatch_shared::types::{Ack, ApiResponse};

use crate::events::publisher;
use crate::feed::eligibility;
use crate::models::{Profile, UpdateProfile};
use crate::schema::{likes, matches, passes, preferences, profiles};
use crate::AppState;

// --- GET /me ---

pub async fn get_profile(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Profile>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let profile = profiles::table
        .filter(profiles::credential_id.eq(user.id))
        .first::<Profile>(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))?;

    Ok(Json(ApiResponse::ok(profile)))
}

// --- PATCH /me ---

pub async fn update_profile(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<UpdateProfile>,
) -> AppResult<Json<ApiResponse<Profile>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let profile = profiles::table
        .filter(profiles::credential_id.eq(user.id))
        .first::<Profile>(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))?;

    let updated = diesel::update(profiles::table.filter(profiles::id.eq(profile.id)))
        .set((
            &payload,
            profiles::updated_at.eq(chrono::Utc::now()),
        ))
        .get_result::<Profile>(&mut conn)?;

    publisher::publish_profile_updated(&state.rabbitmq, updated.id, updated.credential_id).await;

    Ok(Json(ApiResponse::ok(updated)))
}

// --- POST /onboarding ---

#[derive(Debug, Deserialize)]
pub struct OnboardingRequest {
    pub display_name: String,
    pub birth_date: String,
    pub gender: String,
    pub bio: Option<String>,
    pub ethnicity: Option<String>,
    pub religion: Option<String>,
    pub relationship_intention: Option<String>,
    pub education_level: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

pub async fn complete_onboarding(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<OnboardingRequest>,
) -> AppResult<Json<ApiResponse<Profile>>> {
    let name = req.display_name.trim();
    if name.len() < 2 || name.len() > 30 {
        return Err(AppError::new(
            ErrorCode::InvalidDisplayName,
            "display name must be between 2 and 30 characters",
        ));
    }

    let birth_date = NaiveDate::parse_from_str(&req.birth_date, "%Y-%m-%d")
        .map_err(|_| AppError::new(ErrorCode::ValidationError, "invalid birth_date format, expected YYYY-MM-DD"))?;

    let today = chrono::Utc::now().date_naive();
    if eligibility::age_from_birth_date(birth_date, today) < 18 {
        return Err(AppError::new(
            ErrorCode::ValidationError,
            "you must be at least 18 years old",
        ));
    }

    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let profile = profiles::table
        .filter(profiles::credential_id.eq(user.id))
        .first::<Profile>(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))?;

    let updated = diesel::update(profiles::table.filter(profiles::id.eq(profile.id)))
        .set((
            profiles::display_name.eq(name),
            profiles::birth_date.eq(birth_date),
            profiles::gender.eq(&req.gender),
            profiles::bio.eq(&req.bio),
            profiles::ethnicity.eq(&req.ethnicity),
            profiles::religion.eq(&req.religion),
            profiles::relationship_intention.eq(&req.relationship_intention),
            profiles::education_level.eq(&req.education_level),
            profiles::latitude.eq(req.latitude),
            profiles::longitude.eq(req.longitude),
            profiles::onboarding_complete.eq(true),
            profiles::updated_at.eq(chrono::Utc::now()),
        ))
        .get_result::<Profile>(&mut conn)?;

    publisher::publish_profile_updated(&state.rabbitmq, updated.id, updated.credential_id).await;

    tracing::info!(
        credential_id = %user.id,
        display_name = %name,
        "onboarding completed"
    );

    Ok(Json(ApiResponse::ok(updated)))
}

// --- DELETE /me ---

pub async fn delete_account(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ApiResponse<Ack>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let profile = profiles::table
        .filter(profiles::credential_id.eq(user.id))
        .first::<Profile>(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))?;

    conn.transaction::<_, diesel::result::Error, _>(|conn| {
        diesel::delete(
            likes::table.filter(
                likes::from_profile_id.eq(profile.id).or(likes::to_profile_id.eq(profile.id)),
            ),
        )
        .execute(conn)?;

        diesel::delete(
            passes::table.filter(
                passes::from_profile_id.eq(profile.id).or(passes::to_profile_id.eq(profile.id)),
            ),
        )
        .execute(conn)?;

        diesel::delete(
            matches::table.filter(
                matches::user_a.eq(profile.credential_id).or(matches::user_b.eq(profile.credential_id)),
            ),
        )
        .execute(conn)?;

        diesel::delete(preferences::table.filter(preferences::profile_id.eq(profile.id)))
            .execute(conn)?;

        diesel::delete(profiles::table.filter(profiles::id.eq(profile.id))).execute(conn)?;

        Ok(())
    })?;

    publisher::publish_account_deleted(&state.rabbitmq, user.id).await;

    tracing::info!(credential_id = %user.id, "account deleted");

    Ok(Json(ApiResponse::ok(Ack::ok())))
}

// --- GET /profile/:id --- (public profile by credential_id or profile id)

pub async fn get_public_profile(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Profile>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let profile = profiles::table
        .filter(profiles::credential_id.eq(id))
        .first::<Profile>(&mut conn)
        .or_else(|_| {
            profiles::table
                .filter(profiles::id.eq(id))
                .first::<Profile>(&mut conn)
        })
        .map_err(|_| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))?;

    if profile.is_blocked {
        return Err(AppError::new(ErrorCode::ProfileNotFound, "profile not found"));
    }

    Ok(Json(ApiResponse::ok(profile)))
}
