//! Gamification ledger: XP, levels, and badges.
//!
//! Level is derived from XP on demand, never stored. Badges are a set:
//! awarding the same badge twice is a no-op after the first.

use sprig_core::types::{MicroGoal, UserProfile};

/// Ordered level thresholds. The level for a given XP total is the name
/// attached to the highest threshold at or below it.
const LEVELS: &[(u32, &str)] = &[
    (0, "Sprout"),
    (50, "Sapling"),
    (150, "Canopy Hero"),
    (300, "Forest Guardian"),
];

/// Level name for an XP total.
pub fn level_for(xp: u32) -> &'static str {
    LEVELS
        .iter()
        .rev()
        .find(|(threshold, _)| xp >= *threshold)
        .map_or(LEVELS[0].1, |(_, name)| name)
}

/// What an award changed, for composing the congratulations message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwardOutcome {
    pub xp_gained: u32,
    /// New level name, present only when the award crossed a threshold.
    pub level_up: Option<&'static str>,
    /// Badge name, present only when newly earned.
    pub badge: Option<&'static str>,
}

/// Credit a completed goal to the profile.
pub fn award(profile: &mut UserProfile, goal: &MicroGoal) -> AwardOutcome {
    let before = level_for(profile.xp);
    profile.xp += goal.xp;
    let after = level_for(profile.xp);

    let level_up = (after != before).then_some(after);

    let badge = goal
        .badge
        .filter(|name| profile.badges.insert((*name).to_owned()));

    AwardOutcome {
        xp_gained: goal.xp,
        level_up,
        badge,
    }
}
