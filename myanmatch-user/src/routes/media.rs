use axum::extract::{Multipart, State};
use axum::Json;
use diesel::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use myanmatch_shared::clients::storage::{audio_ext, buckets, image_ext};
use myanmatch_shared::errors::{AppError, AppResult, ErrorCode};
use myanmatch_shared::types::auth::AuthUser;
use myanmatch_shared::types::ApiResponse;

use crate::models::Profile;
use crate::schema::profiles;
use crate::AppState;

const MAX_PROFILE_PHOTOS: usize = 6;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
}

async fn read_single_field(multipart: &mut Multipart) -> AppResult<(Vec<u8>, String)> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| AppError::new(ErrorCode::MediaUploadFailed, format!("failed to read multipart: {e}")))?
        .ok_or_else(|| AppError::new(ErrorCode::MediaUploadFailed, "no file provided"))?;

    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();

    let data = field
        .bytes()
        .await
        .map_err(|e| AppError::new(ErrorCode::MediaUploadFailed, format!("failed to read file data: {e}")))?;

    Ok((data.to_vec(), content_type))
}

// --- POST /media --- (profile photo, appended to the media array)

pub async fn upload_photo(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> AppResult<Json<ApiResponse<UploadResponse>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let profile = profiles::table
        .filter(profiles::credential_id.eq(user.id))
        .first::<Profile>(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))?;

    let mut media: Vec<String> = profile
        .media
        .as_array()
        .map(|a| a.iter().filter_map(|v| v.as_str().map(String::from)).collect())
        .unwrap_or_default();

    if media.len() >= MAX_PROFILE_PHOTOS {
        return Err(AppError::new(
            ErrorCode::MediaUploadFailed,
            format!("profile already has {MAX_PROFILE_PHOTOS} photos"),
        ));
    }

    let (data, content_type) = read_single_field(&mut multipart).await?;
    let ext = image_ext(&content_type).ok_or_else(|| {
        AppError::new(
            ErrorCode::MediaUploadFailed,
            "unsupported image format, accepted: jpeg, png, webp, gif",
        )
    })?;

    let file_id = Uuid::now_v7();
    let key = format!("profiles/{}/{}.{}", profile.id, file_id, ext);

    let url = state
        .storage
        .upload(buckets::MEDIA, &key, data, &content_type)
        .await
        .map_err(|e| AppError::new(ErrorCode::MediaUploadFailed, e))?;

    media.push(url.clone());

    diesel::update(profiles::table.filter(profiles::id.eq(profile.id)))
        .set((
            profiles::media.eq(serde_json::json!(media)),
            profiles::updated_at.eq(chrono::Utc::now()),
        ))
        .execute(&mut conn)?;

    tracing::info!(profile_id = %profile.id, url = %url, "profile photo uploaded");

    Ok(Json(ApiResponse::ok(UploadResponse { url })))
}

// --- POST /onboarding/voice --- (voice prompt, returns the public URL)

pub async fn upload_voice_prompt(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> AppResult<Json<ApiResponse<UploadResponse>>> {
    let mut conn = state.db.get().map_err(|e| AppError::internal(e.to_string()))?;

    let profile = profiles::table
        .filter(profiles::credential_id.eq(user.id))
        .first::<Profile>(&mut conn)
        .map_err(|_| AppError::new(ErrorCode::ProfileNotFound, "profile not found"))?;

    let (data, content_type) = read_single_field(&mut multipart).await?;
    let ext = audio_ext(&content_type).ok_or_else(|| {
        AppError::new(
            ErrorCode::MediaUploadFailed,
            "unsupported audio format, accepted: webm, ogg, mp3, m4a, wav",
        )
    })?;

    let file_id = Uuid::now_v7();
    let key = format!("voice/{}/{}.{}", profile.id, file_id, ext);

    let url = state
        .storage
        .upload(buckets::ONBOARDING, &key, data, &content_type)
        .await
        .map_err(|e| AppError::new(ErrorCode::MediaUploadFailed, e))?;

    diesel::update(profiles::table.filter(profiles::id.eq(profile.id)))
        .set((
            profiles::voice_prompt_url.eq(&url),
            profiles::updated_at.eq(chrono::Utc::now()),
        ))
        .execute(&mut conn)?;

    tracing::info!(profile_id = %profile.id, url = %url, "voice prompt uploaded");

    Ok(Json(ApiResponse::ok(UploadResponse { url })))
}
