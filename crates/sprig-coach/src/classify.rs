//! Keyword classification, one pure function per axis.
//!
//! All matching is case-insensitive substring search against fixed
//! keyword tables. Deliberately not NLP: the contract is deterministic,
//! reproducible behavior.

use sprig_core::types::{AgeGroup, EngagementLevel, GoalCategory, MotivationLevel};

const COMPLETED_WORDS: &[&str] = &["yes", "completed", "did it", "yep", "done"];
const MISSED_WORDS: &[&str] = &["no", "couldn't", "nope", "missed"];
const STRUGGLING_WORDS: &[&str] = &["struggle", "hard", "tricky"];

const AFFIRM_WORDS: &[&str] = &["yes", "sounds good", "i'm in", "ready"];
const ALTERNATIVE_WORDS: &[&str] = &["alternative", "different", "another"];
const REFLECTION_WORDS: &[&str] = &["how", "feel", "easy", "hard", "struggle"];

const YOUTH_WORDS: &[&str] = &["student", "teen", "college"];
const ELDERLY_WORDS: &[&str] = &["retired", "senior", "grandparent"];

const SKEPTIC_WORDS: &[&str] = &["skeptic", "not sure", "doubt", "waste of time", "pointless"];
const COMMITTED_WORDS: &[&str] = &["committed", "motivated", "excited", "can't wait", "passionate"];

/// Category keyword rules for goal selection, scanned in order.
///
/// Specific concerns come before broad lifestyle words: an answer like
/// "I drive everywhere but struggle with plastic bags" should match the
/// named concern (bags), not the lifestyle description (drive).
const CATEGORY_RULES: &[(GoalCategory, &[&str])] = &[
    (GoalCategory::ReduceReuseRecycle, &["plastic", "bag"]),
    (GoalCategory::WaterConservation, &["water", "shower"]),
    (
        GoalCategory::EnergySaving,
        &["energy", "lights", "electricity", "laundry", "dryer"],
    ),
    (GoalCategory::FoodWaste, &["food waste", "compost", "leftover"]),
    (GoalCategory::FoodChoices, &["diet", "meat", "plant"]),
    (GoalCategory::Commute, &["car", "drive", "commute"]),
];

fn contains_any(text: &str, words: &[&str]) -> bool {
    let lowered = text.to_lowercase();
    words.iter().any(|word| lowered.contains(word))
}

/// Classify a free-text check-in response.
///
/// Priority order: completed vocabulary, then missed, then struggling,
/// defaulting to missed. Total — always returns a value.
pub fn classify(raw: &str) -> EngagementLevel {
    if contains_any(raw, COMPLETED_WORDS) {
        EngagementLevel::Completed
    } else if contains_any(raw, MISSED_WORDS) {
        EngagementLevel::Missed
    } else if contains_any(raw, STRUGGLING_WORDS) {
        EngagementLevel::Struggling
    } else {
        EngagementLevel::Missed
    }
}

/// Classify a numeric completion rate in `[0, 1]`.
pub fn classify_by_rate(rate: f64) -> EngagementLevel {
    if rate >= 0.8 {
        EngagementLevel::High
    } else if rate >= 0.5 {
        EngagementLevel::Medium
    } else {
        EngagementLevel::Low
    }
}

/// First category whose keywords appear in the preference text.
pub fn category_hint(text: &str) -> Option<GoalCategory> {
    CATEGORY_RULES
        .iter()
        .find(|(_, words)| contains_any(text, words))
        .map(|(category, _)| *category)
}

/// Does a reply to a goal proposal accept it?
pub fn affirms(text: &str) -> bool {
    contains_any(text, AFFIRM_WORDS)
}

/// Does a renegotiation reply ask for a different goal?
pub fn wants_alternative(text: &str) -> bool {
    contains_any(text, ALTERNATIVE_WORDS)
}

/// Does a check-in message read as reflection rather than a status report?
pub fn is_reflection(text: &str) -> bool {
    contains_any(text, REFLECTION_WORDS)
}

pub fn derive_age_group(text: &str) -> Option<AgeGroup> {
    if contains_any(text, YOUTH_WORDS) {
        Some(AgeGroup::Youth)
    } else if contains_any(text, ELDERLY_WORDS) {
        Some(AgeGroup::Elderly)
    } else {
        None
    }
}

pub fn derive_motivation(text: &str) -> Option<MotivationLevel> {
    if contains_any(text, SKEPTIC_WORDS) {
        Some(MotivationLevel::Skeptic)
    } else if contains_any(text, COMMITTED_WORDS) {
        Some(MotivationLevel::Committed)
    } else {
        None
    }
}
