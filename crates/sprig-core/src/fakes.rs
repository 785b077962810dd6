//! Fake implementations for testing.
#![allow(clippy::unwrap_used)]

use crate::traits::{HabitTracker, ProfileStore, TextGenerator};
use crate::types::{CheckinReport, CoachingSession, RegisterHabit, TrackerFeedback, UserProfile};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

// ---------------------------------------------------------------------------
// MemoryProfileStore
// ---------------------------------------------------------------------------

/// In-memory profile store for testing.
#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    store: Mutex<HashMap<String, (UserProfile, CoachingSession)>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn load(&self, user_id: &str) -> Result<Option<(UserProfile, CoachingSession)>> {
        Ok(self.store.lock().unwrap().get(user_id).cloned())
    }

    async fn save(
        &self,
        user_id: &str,
        profile: &UserProfile,
        session: &CoachingSession,
    ) -> Result<()> {
        self.store
            .lock()
            .unwrap()
            .insert(user_id.to_owned(), (profile.clone(), session.clone()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FakeGenerator
// ---------------------------------------------------------------------------

/// Fake generator that returns a canned response, or fails on demand.
#[derive(Debug)]
pub struct FakeGenerator {
    response: Mutex<String>,
    fail: Mutex<bool>,
}

impl FakeGenerator {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: Mutex::new(response.into()),
            fail: Mutex::new(false),
        }
    }

    /// A generator whose every call fails, for exercising fallback paths.
    pub fn failing() -> Self {
        Self {
            response: Mutex::new(String::new()),
            fail: Mutex::new(true),
        }
    }

    pub fn set_response(&self, response: impl Into<String>) {
        *self.response.lock().unwrap() = response.into();
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    fn name(&self) -> &str {
        "fake"
    }

    async fn generate(&self, _prompt: &str) -> Result<String> {
        if *self.fail.lock().unwrap() {
            anyhow::bail!("generation service unavailable");
        }
        Ok(self.response.lock().unwrap().clone())
    }
}

// ---------------------------------------------------------------------------
// RecordingTracker
// ---------------------------------------------------------------------------

/// Fake tracker that records registration commands and replays a queued
/// feedback record for check-ins.
#[derive(Debug, Default)]
pub struct RecordingTracker {
    registered: Mutex<Vec<(String, RegisterHabit)>>,
    next_feedback: Mutex<Option<TrackerFeedback>>,
}

impl RecordingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take_registered(&self) -> Vec<(String, RegisterHabit)> {
        std::mem::take(&mut *self.registered.lock().unwrap())
    }

    pub fn queue_feedback(&self, feedback: TrackerFeedback) {
        *self.next_feedback.lock().unwrap() = Some(feedback);
    }
}

#[async_trait]
impl HabitTracker for RecordingTracker {
    async fn register(&self, user_id: &str, command: RegisterHabit) -> Result<()> {
        self.registered
            .lock()
            .unwrap()
            .push((user_id.to_owned(), command));
        Ok(())
    }

    async fn record(&self, _user_id: &str, report: CheckinReport) -> Result<TrackerFeedback> {
        let queued = self.next_feedback.lock().unwrap().take();
        Ok(queued.unwrap_or(TrackerFeedback {
            habit_id: report.habit_id,
            days_completed: 0,
            days_missed: 0,
            streak: 0,
            engagement: None,
            completion_rate: None,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EngagementLevel;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn memory_store_round_trips() {
        let store = MemoryProfileStore::new();
        assert!(store.load("ada").await.unwrap().is_none());

        let profile = UserProfile {
            xp: 15,
            ..UserProfile::default()
        };
        let session = CoachingSession::default();
        store.save("ada", &profile, &session).await.unwrap();

        let (loaded, _) = store.load("ada").await.unwrap().unwrap();
        assert_eq!(loaded.xp, 15);
    }

    #[tokio::test]
    async fn failing_generator_errors() {
        let generator = FakeGenerator::failing();
        assert!(generator.generate("anything").await.is_err());
    }

    #[tokio::test]
    async fn recording_tracker_captures_commands() {
        let tracker = RecordingTracker::new();
        let command = RegisterHabit {
            habit_id: "lights_off".to_owned(),
            description: "Turn off the lights".to_owned(),
            target_days: 1,
            tracking_window_days: 3,
            start_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        };
        tracker.register("ada", command.clone()).await.unwrap();

        let registered = tracker.take_registered();
        assert_eq!(registered, vec![("ada".to_owned(), command)]);
        assert!(tracker.take_registered().is_empty());
    }

    #[tokio::test]
    async fn recording_tracker_replays_queued_feedback() {
        let tracker = RecordingTracker::new();
        tracker.queue_feedback(TrackerFeedback {
            habit_id: "lights_off".to_owned(),
            days_completed: 2,
            days_missed: 0,
            streak: 2,
            engagement: Some(EngagementLevel::Completed),
            completion_rate: Some(1.0),
        });

        let report = CheckinReport {
            habit_id: "lights_off".to_owned(),
            completed: Some(true),
            note: None,
        };
        let feedback = tracker.record("ada", report).await.unwrap();
        assert_eq!(feedback.streak, 2);
        assert_eq!(feedback.engagement, Some(EngagementLevel::Completed));
    }
}
