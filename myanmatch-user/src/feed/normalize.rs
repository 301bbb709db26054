//! Synonym and alias tables used by the feed filter.
//!
//! Profile attributes arrive as free-ish strings collected by different
//! onboarding screens over time, so both sides of every comparison go
//! through the same normalizer. This module is the single source of truth
//! for these tables.

/// A preference value that imposes no constraint.
pub fn is_no_preference(value: &str) -> bool {
    let v = value.trim().to_lowercase();
    v.is_empty() || v == "no preference" || v == "any" || v == "open to all"
}

/// Collapse gender labels to canonical singular forms.
pub fn gender(raw: &str) -> String {
    let v = raw.trim().to_lowercase();
    match v.as_str() {
        "women" | "female" | "f" => "woman".to_string(),
        "men" | "male" | "m" => "man".to_string(),
        "non-binary" | "non binary" | "enby" => "nonbinary".to_string(),
        _ => v,
    }
}

/// Habit answers (smoking, drinking, weed, drugs) compared verbatim after
/// trimming and lowercasing; "never" collapses onto "no".
pub fn habit(raw: &str) -> String {
    let v = raw.trim().to_lowercase();
    match v.as_str() {
        "never" => "no".to_string(),
        "frequently" | "often" => "yes".to_string(),
        _ => v,
    }
}

/// Ethnicity labels carry parenthetical or localized variants
/// ("Karen (Kayin)", "Rakhine (Arakanese)"); strip the parenthetical and
/// collapse the known localized names onto canonical keys.
pub fn ethnicity(raw: &str) -> String {
    let v = raw.trim().to_lowercase();
    let base = v.split('(').next().unwrap_or(v.as_str()).trim();
    match base {
        "kayin" => "karen".to_string(),
        "burman" | "burmese" => "bamar".to_string(),
        "arakanese" => "rakhine".to_string(),
        "karenni" => "kayah".to_string(),
        "sino-burmese" | "sino burmese" => "chinese".to_string(),
        "burmese-indian" | "burmese indian" => "indian".to_string(),
        _ => base.to_string(),
    }
}

/// Relationship-intention labels from different screens map onto a small
/// canonical set before membership checks.
pub fn intention(raw: &str) -> String {
    let v = raw.trim().to_lowercase();
    match v.as_str() {
        "life partner" | "long term" | "long-term" | "long term relationship"
        | "serious relationship" => "long-term relationship".to_string(),
        "short term" | "short-term" | "short term relationship" | "fun" | "casual"
        | "something casual" => "short-term relationship".to_string(),
        "not sure" | "not sure yet" | "figuring out" | "still figuring it out" => {
            "figuring it out".to_string()
        }
        "friends" | "new friends" => "friendship".to_string(),
        _ => v,
    }
}

/// Plain lowercase/trim for categories without synonym tables
/// (religion, politics, family plans, education).
pub fn plain(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gender_synonyms_collapse() {
        assert_eq!(gender("Women"), "woman");
        assert_eq!(gender("MEN"), "man");
        assert_eq!(gender("Non-Binary"), "nonbinary");
        assert_eq!(gender("woman"), "woman");
    }

    #[test]
    fn ethnicity_parentheticals_stripped() {
        assert_eq!(ethnicity("Karen (Kayin)"), "karen");
        assert_eq!(ethnicity("Rakhine (Arakanese)"), "rakhine");
        assert_eq!(ethnicity("Kayah (Karenni)"), "kayah");
        assert_eq!(ethnicity("Shan"), "shan");
    }

    #[test]
    fn ethnicity_localized_names_collapse() {
        assert_eq!(ethnicity("Kayin"), "karen");
        assert_eq!(ethnicity("Burman"), "bamar");
        assert_eq!(ethnicity("Arakanese"), "rakhine");
        assert_eq!(ethnicity("Sino-Burmese"), "chinese");
    }

    #[test]
    fn intention_synonyms_collapse() {
        assert_eq!(intention("Life Partner"), "long-term relationship");
        assert_eq!(intention("long term"), "long-term relationship");
        assert_eq!(intention("Fun"), "short-term relationship");
        assert_eq!(intention("Not sure yet"), "figuring it out");
    }

    #[test]
    fn habit_never_is_no() {
        assert_eq!(habit("Never"), "no");
        assert_eq!(habit("Sometimes"), "sometimes");
        assert_eq!(habit(" Yes "), "yes");
    }

    #[test]
    fn no_preference_variants() {
        assert!(is_no_preference("No preference"));
        assert!(is_no_preference("  any "));
        assert!(is_no_preference(""));
        assert!(!is_no_preference("Yes"));
    }
}
