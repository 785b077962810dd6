use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Position in the coaching dialogue flow.
///
/// `Unknown` absorbs any stage value read back from storage that this
/// build does not recognize; the engine recovers from it by restarting
/// onboarding instead of failing the turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Initial,
    OnboardingQ1,
    OnboardingQ2,
    OnboardingQ3,
    GoalProposed,
    GoalProposedRenegotiate,
    DailyCheckin,
    AllGoalsCompleted,
    Unknown,
}

impl<'de> Deserialize<'de> for Stage {
    /// Unknown stage names deserialize to `Stage::Unknown` instead of
    /// failing, so a stale stored session never breaks a turn.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(match value.as_str() {
            "initial" => Self::Initial,
            "onboarding_q1" => Self::OnboardingQ1,
            "onboarding_q2" => Self::OnboardingQ2,
            "onboarding_q3" => Self::OnboardingQ3,
            "goal_proposed" => Self::GoalProposed,
            "goal_proposed_renegotiate" => Self::GoalProposedRenegotiate,
            "daily_checkin" => Self::DailyCheckin,
            "all_goals_completed" => Self::AllGoalsCompleted,
            _ => Self::Unknown,
        })
    }
}

/// How well a user performed against a goal.
///
/// `Completed`/`Missed`/`Struggling` come from free-text check-in replies;
/// `High`/`Medium`/`Low` come from numeric completion rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngagementLevel {
    Completed,
    Missed,
    Struggling,
    High,
    Medium,
    Low,
}

/// Category tag for a catalog goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalCategory {
    Commute,
    WaterConservation,
    EnergySaving,
    FoodWaste,
    ReduceReuseRecycle,
    FoodChoices,
}

/// Age-group bucket derived from onboarding answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgeGroup {
    Youth,
    Elderly,
}

/// Motivation bucket derived from onboarding answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MotivationLevel {
    Skeptic,
    Committed,
}

/// An immutable catalog entry: one small, single-day sustainability task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MicroGoal {
    pub id: &'static str,
    pub description: &'static str,
    pub rationale: &'static str,
    pub category: GoalCategory,
    pub xp: u32,
    pub badge: Option<&'static str>,
}

/// Per-user state that outlives any single conversation.
///
/// XP only grows, and completed habits and badges are never removed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub commute: Option<String>,
    #[serde(default)]
    pub eco_awareness: Option<String>,
    #[serde(default)]
    pub goals_challenges: Option<String>,
    #[serde(default)]
    pub age_group: Option<AgeGroup>,
    #[serde(default)]
    pub motivation: Option<MotivationLevel>,
    #[serde(default)]
    pub xp: u32,
    /// Completed goal ids in completion order. Membership-checked on
    /// insert so a goal is only recorded once.
    #[serde(default)]
    pub completed_habits: Vec<String>,
    #[serde(default)]
    pub badges: BTreeSet<String>,
}

impl UserProfile {
    pub fn has_completed(&self, goal_id: &str) -> bool {
        self.completed_habits.iter().any(|id| id == goal_id)
    }

    /// Record a completed goal, preserving set semantics.
    pub fn record_completed(&mut self, goal_id: &str) {
        if !self.has_completed(goal_id) {
            self.completed_habits.push(goal_id.to_owned());
        }
    }
}

/// Mutable per-conversation state, threaded through every turn.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoachingSession {
    #[serde(default)]
    pub stage: Stage,
    /// Catalog id of the currently proposed or active goal.
    #[serde(default)]
    pub current_goal: Option<String>,
    /// Most recent tracker feedback per habit id.
    #[serde(default)]
    pub feedback: HashMap<String, TrackerFeedback>,
}

/// A tracker report describing how a goal went.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerFeedback {
    pub habit_id: String,
    #[serde(default)]
    pub days_completed: u32,
    #[serde(default)]
    pub days_missed: u32,
    #[serde(default)]
    pub streak: u32,
    /// Absent on malformed reports; the engine then falls back to
    /// missed-style handling.
    #[serde(default)]
    pub engagement: Option<EngagementLevel>,
    #[serde(default)]
    pub completion_rate: Option<f64>,
}

/// Command dispatched to the habit-tracking collaborator when the user
/// commits to a goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterHabit {
    pub habit_id: String,
    pub description: String,
    pub target_days: u32,
    pub tracking_window_days: u32,
    pub start_date: NaiveDate,
}

/// A user's raw daily check-in, as received at the transport boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckinReport {
    pub habit_id: String,
    /// Explicit completion flag (structured reports).
    #[serde(default)]
    pub completed: Option<bool>,
    /// Free-text status (classified by keyword when no flag is present).
    #[serde(default)]
    pub note: Option<String>,
}

/// One incoming turn: either a plain user message or a tracker report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TurnInput {
    Message(String),
    Feedback(TrackerFeedback),
}

/// The engine's reply for one turn: outgoing text plus an optional
/// structured side effect for the tracking collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReply {
    pub text: String,
    pub side_effect: Option<RegisterHabit>,
}

impl TurnReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            side_effect: None,
        }
    }

    pub fn with_side_effect(text: impl Into<String>, command: RegisterHabit) -> Self {
        Self {
            text: text.into(),
            side_effect: Some(command),
        }
    }
}
