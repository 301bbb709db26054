use chrono::{DateTime, Duration, Utc};

/// Bounds of the fixed UTC day the timestamp falls in: `[00:00, 24:00)`.
pub fn utc_day_bounds(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = now
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .expect("midnight is always valid")
        .and_utc();
    (start, start + Duration::days(1))
}

/// Daily like allowance per membership plan; `None` means unlimited.
pub fn daily_like_quota(plan: &str, free_quota: i64, gold_quota: i64) -> Option<i64> {
    match plan.trim().to_lowercase().as_str() {
        "platinum" => None,
        "gold" => Some(gold_quota),
        _ => Some(free_quota),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn day_bounds_cover_whole_utc_day() {
        let now = Utc.with_ymd_and_hms(2026, 3, 5, 23, 59, 59).unwrap();
        let (start, end) = utc_day_bounds(now);
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 3, 5, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 3, 6, 0, 0, 0).unwrap());
        assert!(start <= now && now < end);
    }

    #[test]
    fn midnight_starts_a_new_window() {
        let midnight = Utc.with_ymd_and_hms(2026, 3, 6, 0, 0, 0).unwrap();
        let (start, _) = utc_day_bounds(midnight);
        assert_eq!(start, midnight);
    }

    #[test]
    fn quota_by_plan() {
        assert_eq!(daily_like_quota("free", 10, 50), Some(10));
        assert_eq!(daily_like_quota("Gold", 10, 50), Some(50));
        assert_eq!(daily_like_quota("platinum", 10, 50), None);
        // Unknown plans get the free allowance
        assert_eq!(daily_like_quota("legacy", 10, 50), Some(10));
    }
}
