//! Collaborator contracts for sprig.
//!
//! These define the seams between the coaching core and its external
//! services. Implementations live in other crates (sprig-memory for the
//! store, sprig-agent for generation, sprig-gateway for tracking).

use crate::types::{CheckinReport, CoachingSession, RegisterHabit, TrackerFeedback, UserProfile};
use anyhow::Result;
use async_trait::async_trait;

/// Persistent per-user state, keyed by user identifier.
///
/// Implementations must serialize concurrent writes for the same key —
/// last-write-wins between racing turns is not acceptable.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Load a user's profile and session. `None` on first contact.
    async fn load(&self, user_id: &str) -> Result<Option<(UserProfile, CoachingSession)>>;

    /// Persist a user's profile and session atomically.
    async fn save(
        &self,
        user_id: &str,
        profile: &UserProfile,
        session: &CoachingSession,
    ) -> Result<()>;
}

/// A text-generation service that phrases coaching copy from a prompt.
///
/// Any error means the service is unavailable; callers substitute canned
/// text and carry on rather than surfacing the failure to the user.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generator name (e.g. "anthropic").
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// The habit-tracking collaborator.
///
/// Receives a registration command when a goal is confirmed, and folds
/// raw check-ins into `TrackerFeedback` records that re-enter the
/// coaching engine as input.
#[async_trait]
pub trait HabitTracker: Send + Sync {
    /// Start (or restart) tracking a habit for a user.
    async fn register(&self, user_id: &str, command: RegisterHabit) -> Result<()>;

    /// Fold a check-in into the habit's log and report progress.
    async fn record(&self, user_id: &str, report: CheckinReport) -> Result<TrackerFeedback>;
}
