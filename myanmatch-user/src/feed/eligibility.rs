//! Candidate eligibility predicate and feed ordering.
//!
//! Pure and synchronous: the route fetches a candidate page, this module
//! decides who survives and in what order. Every comparison runs both sides
//! through the tables in [`normalize`].

use std::cmp::Ordering;

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use super::normalize;
use crate::models::{Preferences, Profile};

/// Candidate age: the stored override wins, otherwise computed from the
/// birth date. `None` means unresolvable.
pub fn resolve_age(profile: &Profile, today: NaiveDate) -> Option<i32> {
    if let Some(age) = profile.age {
        return Some(age);
    }
    profile.birth_date.map(|b| age_from_birth_date(b, today))
}

/// Whole years completed between a birth date and a reference date.
pub fn age_from_birth_date(birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut years = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    years
}

fn string_list(value: &serde_json::Value) -> Vec<String> {
    value
        .as_array()
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str())
                .map(|s| s.to_string())
                .collect()
        })
        .unwrap_or_default()
}

fn habit_ok(pref: Option<&str>, value: Option<&str>) -> bool {
    let pref = match pref {
        Some(p) if !normalize::is_no_preference(p) => p,
        _ => return true,
    };
    match value {
        Some(v) => normalize::habit(v) == normalize::habit(pref),
        None => false,
    }
}

fn multi_ok(
    wanted: &serde_json::Value,
    value: Option<&str>,
    norm: fn(&str) -> String,
) -> bool {
    let wanted = string_list(wanted);
    if wanted.is_empty() {
        return true;
    }
    let Some(v) = value else {
        return false;
    };
    let v = norm(v);
    wanted.iter().any(|w| norm(w) == v)
}

/// The full decision sequence; all checks must pass, the first failure
/// excludes the candidate.
pub fn is_eligible(candidate: &Profile, prefs: &Preferences, today: NaiveDate) -> bool {
    // 1. Age bounds, only when the age is resolvable
    if let Some(age) = resolve_age(candidate, today) {
        if age < prefs.age_min || age > prefs.age_max {
            return false;
        }
    }

    // 2. Gender set membership
    let wanted_genders = string_list(&prefs.genders);
    if !wanted_genders.is_empty() {
        let Some(g) = candidate.gender.as_deref() else {
            return false;
        };
        let g = normalize::gender(g);
        if !wanted_genders.iter().any(|w| normalize::gender(w) == g) {
            return false;
        }
    }

    // 3. Verified-only
    if prefs.verified_only && !candidate.is_verified {
        return false;
    }

    // 4. Voice prompt required
    if prefs.has_voice {
        let has_voice = candidate
            .voice_prompt_url
            .as_deref()
            .map(|u| !u.trim().is_empty())
            .unwrap_or(false);
        if !has_voice {
            return false;
        }
    }

    // 5. Habit fields: a specific preference needs an exact normalized match
    if !habit_ok(prefs.smoking.as_deref(), candidate.smoking.as_deref()) {
        return false;
    }
    if !habit_ok(prefs.drinking.as_deref(), candidate.drinking.as_deref()) {
        return false;
    }
    if !habit_ok(prefs.weed.as_deref(), candidate.weed.as_deref()) {
        return false;
    }
    if !habit_ok(prefs.drugs.as_deref(), candidate.drugs.as_deref()) {
        return false;
    }

    // 6. Multi-select categories
    if !multi_ok(&prefs.religions, candidate.religion.as_deref(), normalize::plain) {
        return false;
    }
    if !multi_ok(&prefs.politics, candidate.politics.as_deref(), normalize::plain) {
        return false;
    }
    if !multi_ok(&prefs.family_plans, candidate.family_plans.as_deref(), normalize::plain) {
        return false;
    }
    if !multi_ok(&prefs.ethnicities, candidate.ethnicity.as_deref(), normalize::ethnicity) {
        return false;
    }

    // 7. Relationship intention, both sides through the synonym table
    if !multi_ok(
        &prefs.relationship_intentions,
        candidate.relationship_intention.as_deref(),
        normalize::intention,
    ) {
        return false;
    }

    // 8. Education level, exact case-insensitive
    if let Some(level) = prefs.education_level.as_deref() {
        if !normalize::is_no_preference(level) {
            match candidate.education_level.as_deref() {
                Some(c) if normalize::plain(c) == normalize::plain(level) => {}
                _ => return false,
            }
        }
    }

    true
}

/// Haversine distance in km between two lat/lng points.
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    const R: f64 = 6371.0; // Earth radius in km
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();
    R * c
}

/// Everything the comparator needs to know about the viewer.
#[derive(Debug, Clone, Copy)]
pub struct Viewer {
    pub age: Option<i32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Viewer {
    pub fn of(profile: &Profile, today: NaiveDate) -> Self {
        Self {
            age: resolve_age(profile, today),
            latitude: profile.latitude,
            longitude: profile.longitude,
        }
    }
}

fn age_delta(candidate: &Profile, viewer: &Viewer, today: NaiveDate) -> Option<i32> {
    match (resolve_age(candidate, today), viewer.age) {
        (Some(c), Some(v)) => Some((c - v).abs()),
        _ => None,
    }
}

fn distance_km(candidate: &Profile, viewer: &Viewer) -> Option<f64> {
    match (viewer.latitude, viewer.longitude, candidate.latitude, candidate.longitude) {
        (Some(lat1), Some(lng1), Some(lat2), Some(lng2)) => {
            Some(haversine_km(lat1, lng1, lat2, lng2))
        }
        _ => None,
    }
}

fn cmp_option<T: PartialOrd>(a: Option<T>, b: Option<T>) -> Ordering {
    // Missing values sort last
    match (a, b) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Order surviving candidates: active boosts first, then ascending age
/// delta (unresolvable last), ties by ascending distance (missing
/// coordinates last).
pub fn rank(candidates: &mut [Profile], viewer: &Viewer, now: DateTime<Utc>) {
    let today = now.date_naive();
    candidates.sort_by(|a, b| {
        let a_boosted = a.boost_expires_at.map(|t| t > now).unwrap_or(false);
        let b_boosted = b.boost_expires_at.map(|t| t > now).unwrap_or(false);
        b_boosted
            .cmp(&a_boosted)
            .then_with(|| cmp_option(age_delta(a, viewer, today), age_delta(b, viewer, today)))
            .then_with(|| cmp_option(distance_km(a, viewer), distance_km(b, viewer)))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 15).unwrap()
    }

    fn profile() -> Profile {
        Profile {
            id: Uuid::now_v7(),
            credential_id: Uuid::now_v7(),
            display_name: Some("Thiri".to_string()),
            bio: None,
            gender: Some("woman".to_string()),
            birth_date: None,
            age: Some(25),
            media: serde_json::json!([]),
            voice_prompt_url: None,
            prompts: serde_json::json!([]),
            smoking: None,
            drinking: None,
            weed: None,
            drugs: None,
            religion: None,
            politics: None,
            family_plans: None,
            ethnicity: None,
            relationship_intention: None,
            education_level: None,
            membership_plan: "free".to_string(),
            is_verified: false,
            is_blocked: false,
            is_welcome_sender: false,
            boost_expires_at: None,
            latitude: None,
            longitude: None,
            onboarding_complete: true,
            last_seen_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn prefs() -> Preferences {
        Preferences {
            id: Uuid::now_v7(),
            profile_id: Uuid::now_v7(),
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
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn age_outside_bounds_excluded() {
        let mut p = prefs();
        p.age_min = 21;
        p.age_max = 30;

        let mut c = profile();
        c.age = Some(35);
        assert!(!is_eligible(&c, &p, today()));

        c.age = Some(20);
        assert!(!is_eligible(&c, &p, today()));

        c.age = Some(25);
        assert!(is_eligible(&c, &p, today()));
    }

    #[test]
    fn age_computed_from_birth_date() {
        let mut p = prefs();
        p.age_min = 21;
        p.age_max = 30;

        let mut c = profile();
        c.age = None;
        c.birth_date = NaiveDate::from_ymd_opt(1990, 1, 1); // 36 at the fixed today
        assert!(!is_eligible(&c, &p, today()));
    }

    #[test]
    fn unresolvable_age_not_excluded() {
        let mut p = prefs();
        p.age_min = 21;
        p.age_max = 30;

        let mut c = profile();
        c.age = None;
        c.birth_date = None;
        assert!(is_eligible(&c, &p, today()));
    }

    #[test]
    fn gender_outside_requested_set_excluded() {
        let mut p = prefs();
        p.genders = serde_json::json!(["Women"]);

        let mut c = profile();
        c.gender = Some("man".to_string());
        assert!(!is_eligible(&c, &p, today()));

        c.gender = Some("woman".to_string());
        assert!(is_eligible(&c, &p, today()));
    }

    #[test]
    fn gender_missing_with_requested_set_excluded() {
        let mut p = prefs();
        p.genders = serde_json::json!(["woman"]);

        let mut c = profile();
        c.gender = None;
        assert!(!is_eligible(&c, &p, today()));
    }

    #[test]
    fn verified_only_requires_flag() {
        let mut p = prefs();
        p.verified_only = true;

        let mut c = profile();
        assert!(!is_eligible(&c, &p, today()));

        c.is_verified = true;
        assert!(is_eligible(&c, &p, today()));
    }

    #[test]
    fn voice_required() {
        let mut p = prefs();
        p.has_voice = true;

        let mut c = profile();
        assert!(!is_eligible(&c, &p, today()));

        c.voice_prompt_url = Some("  ".to_string());
        assert!(!is_eligible(&c, &p, today()));

        c.voice_prompt_url = Some("https://cdn.test/onboarding/x.webm".to_string());
        assert!(is_eligible(&c, &p, today()));
    }

    #[test]
    fn drinking_yes_excludes_no_and_unset() {
        let mut p = prefs();
        p.drinking = Some("Yes".to_string());

        let mut c = profile();
        c.drinking = Some("No".to_string());
        assert!(!is_eligible(&c, &p, today()));

        c.drinking = None;
        assert!(!is_eligible(&c, &p, today()));

        c.drinking = Some("yes".to_string());
        assert!(is_eligible(&c, &p, today()));
    }

    #[test]
    fn drinking_no_preference_admits_all() {
        let mut p = prefs();
        p.drinking = Some("No preference".to_string());

        let mut c = profile();
        c.drinking = Some("No".to_string());
        assert!(is_eligible(&c, &p, today()));

        c.drinking = None;
        assert!(is_eligible(&c, &p, today()));
    }

    #[test]
    fn ethnicity_alias_invariant() {
        let mut p = prefs();
        p.ethnicities = serde_json::json!(["karen"]);

        let mut c = profile();
        c.ethnicity = Some("Karen (Kayin)".to_string());
        assert!(is_eligible(&c, &p, today()));

        c.ethnicity = Some("Shan".to_string());
        assert!(!is_eligible(&c, &p, today()));
    }

    #[test]
    fn religion_overlap_required_when_chosen() {
        let mut p = prefs();
        p.religions = serde_json::json!(["Buddhist", "Christian"]);

        let mut c = profile();
        c.religion = Some("buddhist".to_string());
        assert!(is_eligible(&c, &p, today()));

        c.religion = Some("Hindu".to_string());
        assert!(!is_eligible(&c, &p, today()));

        c.religion = None;
        assert!(!is_eligible(&c, &p, today()));
    }

    #[test]
    fn intention_synonyms_match() {
        let mut p = prefs();
        p.relationship_intentions = serde_json::json!(["Life partner"]);

        let mut c = profile();
        c.relationship_intention = Some("Long-term relationship".to_string());
        assert!(is_eligible(&c, &p, today()));

        c.relationship_intention = Some("Casual".to_string());
        assert!(!is_eligible(&c, &p, today()));
    }

    #[test]
    fn education_exact_case_insensitive() {
        let mut p = prefs();
        p.education_level = Some("Bachelor's degree".to_string());

        let mut c = profile();
        c.education_level = Some("bachelor's degree".to_string());
        assert!(is_eligible(&c, &p, today()));

        c.education_level = Some("High school".to_string());
        assert!(!is_eligible(&c, &p, today()));
    }

    // --- ordering ---

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn closer_age_sorts_first() {
        let viewer = Viewer { age: Some(30), latitude: None, longitude: None };

        let mut younger = profile();
        younger.age = Some(25);
        let mut older = profile();
        older.age = Some(40);

        let mut list = vec![older.clone(), younger.clone()];
        rank(&mut list, &viewer, now());
        assert_eq!(list[0].id, younger.id);
        assert_eq!(list[1].id, older.id);
    }

    #[test]
    fn unresolvable_age_sorts_last() {
        let viewer = Viewer { age: Some(30), latitude: None, longitude: None };

        let mut ageless = profile();
        ageless.age = None;
        ageless.birth_date = None;
        let mut aged = profile();
        aged.age = Some(45);

        let mut list = vec![ageless.clone(), aged.clone()];
        rank(&mut list, &viewer, now());
        assert_eq!(list[0].id, aged.id);
    }

    #[test]
    fn distance_breaks_age_ties() {
        // Viewer in Yangon; same age delta, Mandalay is farther than Bago.
        let viewer = Viewer {
            age: Some(30),
            latitude: Some(16.8409),
            longitude: Some(96.1735),
        };

        let mut near = profile();
        near.age = Some(28);
        near.latitude = Some(17.3350); // Bago
        near.longitude = Some(96.4815);

        let mut far = profile();
        far.age = Some(32);
        far.latitude = Some(21.9588); // Mandalay
        far.longitude = Some(96.0891);

        let mut list = vec![far.clone(), near.clone()];
        rank(&mut list, &viewer, now());
        assert_eq!(list[0].id, near.id);
        assert_eq!(list[1].id, far.id);
    }

    #[test]
    fn missing_coordinates_sort_last_within_tie() {
        let viewer = Viewer {
            age: Some(30),
            latitude: Some(16.8409),
            longitude: Some(96.1735),
        };

        let mut located = profile();
        located.age = Some(28);
        located.latitude = Some(17.3350);
        located.longitude = Some(96.4815);

        let mut unlocated = profile();
        unlocated.age = Some(32);

        let mut list = vec![unlocated.clone(), located.clone()];
        rank(&mut list, &viewer, now());
        assert_eq!(list[0].id, located.id);
    }

    #[test]
    fn active_boost_ranks_first() {
        let viewer = Viewer { age: Some(30), latitude: None, longitude: None };

        let mut close_age = profile();
        close_age.age = Some(30);

        let mut boosted = profile();
        boosted.age = Some(45);
        boosted.boost_expires_at = Some(now() + chrono::Duration::minutes(10));

        let mut expired_boost = profile();
        expired_boost.age = Some(29);
        expired_boost.boost_expires_at = Some(now() - chrono::Duration::minutes(10));

        let mut list = vec![close_age.clone(), expired_boost.clone(), boosted.clone()];
        rank(&mut list, &viewer, now());
        assert_eq!(list[0].id, boosted.id);
        // Expired boost falls back to plain age-delta ordering
        assert_eq!(list[1].id, close_age.id);
        assert_eq!(list[2].id, expired_boost.id);
    }

    #[test]
    fn haversine_yangon_mandalay() {
        let km = haversine_km(16.8409, 96.1735, 21.9588, 96.0891);
        assert!((km - 569.0).abs() < 10.0, "got {km}");
    }
}
