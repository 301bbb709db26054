use serde::Deserialize;
use uuid::Uuid;

use myanmatch_shared::errors::{AppError, AppResult, ErrorCode};

#[derive(Debug, Deserialize)]
struct ProfileEnvelope {
    data: ProfileView,
}

#[derive(Debug, Deserialize)]
pub struct ProfileView {
    pub credential_id: Uuid,
    #[serde(default)]
    pub media: serde_json::Value,
    #[serde(default)]
    pub is_verified: bool,
}

impl ProfileView {
    /// The first media entry is the avatar.
    pub fn avatar_url(&self) -> Option<&str> {
        self.media.as_array()?.first()?.as_str()
    }
}

/// Fetch the live profile from the user service's internal API.
pub async fn fetch_profile(
    http: &reqwest::Client,
    user_base: &str,
    user_id: Uuid,
) -> AppResult<ProfileView> {
    let resp = http
        .get(format!("{user_base}/internal/profiles/{user_id}"))
        .send()
        .await
        .map_err(|e| AppError::new(ErrorCode::ServiceUnavailable, format!("user service unreachable: {e}")))?;

    if resp.status().as_u16() == 404 {
        return Err(AppError::new(ErrorCode::ProfileNotFound, "profile not found"));
    }
    if !resp.status().is_success() {
        return Err(AppError::new(
            ErrorCode::ServiceUnavailable,
            format!("user service error: {}", resp.status()),
        ));
    }

    let envelope = resp
        .json::<ProfileEnvelope>()
        .await
        .map_err(|e| AppError::internal(format!("bad profile payload: {e}")))?;

    Ok(envelope.data)
}

/// Flip the verified flag after an approval.
pub async fn mark_verified(
    http: &reqwest::Client,
    user_base: &str,
    user_id: Uuid,
) -> AppResult<()> {
    let resp = http
        .post(format!("{user_base}/internal/verify/{user_id}"))
        .send()
        .await
        .map_err(|e| AppError::new(ErrorCode::ServiceUnavailable, format!("user service unreachable: {e}")))?;

    if !resp.status().is_success() {
        return Err(AppError::new(
            ErrorCode::ServiceUnavailable,
            format!("verify call failed: {}", resp.status()),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn avatar_is_first_media_entry() {
        let view = ProfileView {
            credential_id: Uuid::now_v7(),
            media: serde_json::json!(["https://cdn.test/a.jpg", "https://cdn.test/b.jpg"]),
            is_verified: false,
        };
        assert_eq!(view.avatar_url(), Some("https://cdn.test/a.jpg"));
    }

    #[test]
    fn empty_media_has_no_avatar() {
        let view = ProfileView {
            credential_id: Uuid::now_v7(),
            media: serde_json::json!([]),
            is_verified: false,
        };
        assert_eq!(view.avatar_url(), None);
    }
}
