use diesel::prelude::*;
use uuid::Uuid;

use myanmatch_shared::clients::db::DbPool;
use myanmatch_shared::errors::{AppError, AppResult};

use crate::models::{NewLike, NewPreferences, NewProfile, Profile};
use crate::schema::{likes, preferences, profiles};

/// Create the default profile (and its empty preference row) for a newly
/// registered credential. Idempotent: a second event for the same subject is
/// a no-op.
pub fn create_default_profile(pool: &DbPool, credential_id: Uuid) -> AppResult<Profile> {
    let mut conn = pool.get().map_err(|e| AppError::internal(e.to_string()))?;

    if let Some(existing) = profiles::table
        .filter(profiles::credential_id.eq(credential_id))
        .first::<Profile>(&mut conn)
        .optional()?
    {
        return Ok(existing);
    }

    let profile = conn.transaction::<Profile, diesel::result::Error, _>(|conn| {
        let profile = diesel::insert_into(profiles::table)
            .values(&NewProfile { credential_id })
            .get_result::<Profile>(conn)?;

        diesel::insert_into(preferences::table)
            .values(&NewPreferences { profile_id: profile.id })
            .execute(conn)?;

        Ok(profile)
    })?;

    Ok(profile)
}

/// Seed welcome likes for a fresh profile from the curated welcome-sender
/// accounts, so the likes screen is not empty on first open.
pub fn seed_welcome_likes(pool: &DbPool, profile_id: Uuid, count: i64) -> AppResult<usize> {
    let mut conn = pool.get().map_err(|e| AppError::internal(e.to_string()))?;

    let senders: Vec<Uuid> = profiles::table
        .filter(profiles::is_welcome_sender.eq(true))
        .filter(profiles::id.ne(profile_id))
        .order(profiles::last_seen_at.desc().nulls_last())
        .limit(count)
        .select(profiles::id)
        .load(&mut conn)?;

    let rows: Vec<NewLike> = senders
        .into_iter()
        .map(|sender| NewLike {
            from_profile_id: sender,
            to_profile_id: profile_id,
            like_type: "like".to_string(),
            comment: None,
            gift_id: None,
        })
        .collect();

    if rows.is_empty() {
        return Ok(0);
    }

    let inserted = diesel::insert_into(likes::table)
        .values(&rows)
        .execute(&mut conn)?;

    tracing::info!(profile_id = %profile_id, count = inserted, "welcome likes seeded");
    Ok(inserted)
}

/// Flip the blocked flag in response to moderation events.
pub fn set_blocked(pool: &DbPool, credential_id: Uuid, blocked: bool) -> AppResult<usize> {
    let mut conn = pool.get().map_err(|e| AppError::internal(e.to_string()))?;

    let updated = diesel::update(profiles::table.filter(profiles::credential_id.eq(credential_id)))
        .set((
            profiles::is_blocked.eq(blocked),
            profiles::updated_at.eq(chrono::Utc::now()),
        ))
        .execute(&mut conn)?;

    Ok(updated)
}
