//! Goal selection: preference match first, catalog order second.

use crate::catalog::GoalCatalog;
use crate::classify;
use sprig_core::types::{MicroGoal, UserProfile};

/// Result of picking the next goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Goal(&'static MicroGoal),
    /// Every catalog goal is already completed. Not an error: the caller
    /// moves the conversation to its "all goals completed" stage.
    Exhausted,
}

/// Pick the next uncompleted goal for a profile.
///
/// If the preference text names a category (keyword match), the first
/// uncompleted goal of that category wins. Otherwise, or when the matched
/// category has no uncompleted goal left, fall back to the first
/// uncompleted goal in catalog order. Deterministic; no randomness.
pub fn select_next(
    catalog: &GoalCatalog,
    profile: &UserProfile,
    preference: &str,
) -> Selection {
    if let Some(category) = classify::category_hint(preference)
        && let Some(goal) = catalog
            .iter()
            .find(|goal| goal.category == category && !profile.has_completed(goal.id))
    {
        return Selection::Goal(goal);
    }

    catalog
        .iter()
        .find(|goal| !profile.has_completed(goal.id))
        .map_or(Selection::Exhausted, Selection::Goal)
}

/// First uncompleted goal other than `exclude`, in catalog order.
/// Used when the user asks for an alternative to the current proposal.
pub fn select_alternative(
    catalog: &GoalCatalog,
    profile: &UserProfile,
    exclude: &str,
) -> Option<&'static MicroGoal> {
    catalog
        .iter()
        .find(|goal| goal.id != exclude && !profile.has_completed(goal.id))
}
