use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::{likes, matches, passes, preferences, profiles};

// --- Profile ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = profiles)]
pub struct Profile {
    pub id: Uuid,
    pub credential_id: Uuid,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub gender: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub age: Option<i32>,
    pub media: serde_json::Value,
    pub voice_prompt_url: Option<String>,
    pub prompts: serde_json::Value,
    pub smoking: Option<String>,
    pub drinking: Option<String>,
    pub weed: Option<String>,
    pub drugs: Option<String>,
    pub religion: Option<String>,
    pub politics: Option<String>,
    pub family_plans: Option<String>,
    pub ethnicity: Option<String>,
    pub relationship_intention: Option<String>,
    pub education_level: Option<String>,
    pub membership_plan: String,
    pub is_verified: bool,
    pub is_blocked: bool,
    pub is_welcome_sender: bool,
    pub boost_expires_at: Option<DateTime<Utc>>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub onboarding_complete: bool,
    pub last_seen_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = profiles)]
pub struct NewProfile {
    pub credential_id: Uuid,
}

#[derive(Debug, AsChangeset, Deserialize, Default)]
#[diesel(table_name = profiles)]
pub struct UpdateProfile {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub gender: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub age: Option<i32>,
    pub prompts: Option<serde_json::Value>,
    pub smoking: Option<String>,
    pub drinking: Option<String>,
    pub weed: Option<String>,
    pub drugs: Option<String>,
    pub religion: Option<String>,
    pub politics: Option<String>,
    pub family_plans: Option<String>,
    pub ethnicity: Option<String>,
    pub relationship_intention: Option<String>,
    pub education_level: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

// --- Preferences ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = preferences)]
pub struct Preferences {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub age_min: i32,
    pub age_max: i32,
    pub genders: serde_json::Value,
    pub smoking: Option<String>,
    pub drinking: Option<String>,
    pub weed: Option<String>,
    pub drugs: Option<String>,
    pub religions: serde_json::Value,
    pub politics: serde_json::Value,
    pub family_plans: serde_json::Value,
    pub ethnicities: serde_json::Value,
    pub relationship_intentions: serde_json::Value,
    pub education_level: Option<String>,
    pub verified_only: bool,
    pub has_voice: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = preferences)]
pub struct NewPreferences {
    pub profile_id: Uuid,
}

impl Preferences {
    /// A preference row that filters nothing; used when the stored row is
    /// missing so the feed still works.
    pub fn permissive(profile_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            profile_id,
            age_min: 18,
            age_max: 99,
            genders: serde_json::json!([]),
            smoking: None,
            drinking: None,
            weed: None,
            drugs: None,
            religions: serde_json::json!([]),
            politics: serde_json::json!([]),
            family_plans: serde_json::json!([]),
            ethnicities: serde_json::json!([]),
            relationship_intentions: serde_json::json!([]),
            education_level: None,
            verified_only: false,
            has_voice: false,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, AsChangeset, Deserialize, Default)]
#[diesel(table_name = preferences)]
pub struct UpdatePreferences {
    pub age_min: Option<i32>,
    pub age_max: Option<i32>,
    pub genders: Option<serde_json::Value>,
    pub smoking: Option<String>,
    pub drinking: Option<String>,
    pub weed: Option<String>,
    pub drugs: Option<String>,
    pub religions: Option<serde_json::Value>,
    pub politics: Option<serde_json::Value>,
    pub family_plans: Option<serde_json::Value>,
    pub ethnicities: Option<serde_json::Value>,
    pub relationship_intentions: Option<serde_json::Value>,
    pub education_level: Option<String>,
    pub verified_only: Option<bool>,
    pub has_voice: Option<bool>,
}

// --- Like ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = likes)]
pub struct Like {
    pub id: Uuid,
    pub from_profile_id: Uuid,
    pub to_profile_id: Uuid,
    pub like_type: String,
    pub comment: Option<String>,
    pub gift_id: Option<Uuid>,
    pub is_visible: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = likes)]
pub struct NewLike {
    pub from_profile_id: Uuid,
    pub to_profile_id: Uuid,
    pub like_type: String,
    pub comment: Option<String>,
    pub gift_id: Option<Uuid>,
}

// --- Pass ---

#[derive(Debug, Queryable, Identifiable, Serialize)]
#[diesel(table_name = passes)]
pub struct Pass {
    pub id: Uuid,
    pub from_profile_id: Uuid,
    pub to_profile_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = passes)]
pub struct NewPass {
    pub from_profile_id: Uuid,
    pub to_profile_id: Uuid,
}

// --- Match ---

#[derive(Debug, Queryable, Identifiable, Serialize)]
#[diesel(table_name = matches)]
pub struct Match {
    pub id: Uuid,
    pub user_a: Uuid,
    pub user_b: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = matches)]
pub struct NewMatch {
    pub user_a: Uuid,
    pub user_b: Uuid,
}

impl NewMatch {
    /// Matches are stored as an ordered pair so the pair is unique
    /// regardless of who liked last.
    pub fn for_pair(a: Uuid, b: Uuid) -> Self {
        if a <= b {
            Self { user_a: a, user_b: b }
        } else {
            Self { user_a: b, user_b: a }
        }
    }
}
