//! In-process habit tracker.
//!
//! Keeps a per-(user, habit) completion log, folds raw check-ins into
//! `TrackerFeedback` (days completed/missed, streak, completion rate,
//! engagement level) for the coaching engine.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use sprig_coach::classify;
use sprig_core::traits::HabitTracker;
use sprig_core::types::{CheckinReport, EngagementLevel, RegisterHabit, TrackerFeedback};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

#[derive(Debug)]
struct HabitRecord {
    command: RegisterHabit,
    /// One entry per check-in: true when the day counted as done.
    log: Vec<bool>,
}

#[derive(Debug, Default)]
pub(crate) struct LocalTracker {
    habits: Mutex<HashMap<(String, String), HabitRecord>>,
}

impl LocalTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

/// Consecutive completed check-ins, counted from the most recent.
fn streak_of(log: &[bool]) -> u32 {
    log.iter().rev().take_while(|done| **done).count() as u32
}

#[async_trait]
impl HabitTracker for LocalTracker {
    async fn register(&self, user_id: &str, command: RegisterHabit) -> Result<()> {
        debug!(user = user_id, habit = %command.habit_id, "habit registered");
        let key = (user_id.to_owned(), command.habit_id.clone());
        // Re-registering rebuilds the record: the log starts over.
        self.habits
            .lock()
            .expect("tracker mutex poisoned")
            .insert(key, HabitRecord {
                command,
                log: Vec::new(),
            });
        Ok(())
    }

    async fn record(&self, user_id: &str, report: CheckinReport) -> Result<TrackerFeedback> {
        let engagement = match (report.completed, report.note.as_deref()) {
            (Some(true), _) => Some(EngagementLevel::Completed),
            (Some(false), _) => Some(EngagementLevel::Missed),
            (None, Some(note)) => Some(classify::classify(note)),
            (None, None) => None,
        };

        let mut habits = self.habits.lock().expect("tracker mutex poisoned");
        let key = (user_id.to_owned(), report.habit_id.clone());
        let record = habits.entry(key).or_insert_with(|| {
            // Check-in for a habit we never saw registered. Track it
            // anyway rather than rejecting the report.
            debug!(user = user_id, habit = %report.habit_id, "implicit habit record");
            HabitRecord {
                command: RegisterHabit {
                    habit_id: report.habit_id.clone(),
                    description: report.habit_id.clone(),
                    target_days: 1,
                    tracking_window_days: 3,
                    start_date: Utc::now().date_naive(),
                },
                log: Vec::new(),
            }
        });

        if let Some(engagement) = engagement {
            record.log.push(engagement == EngagementLevel::Completed);
        }

        let days_completed = record.log.iter().filter(|done| **done).count() as u32;
        let days_missed = record.log.len() as u32 - days_completed;
        let streak = streak_of(&record.log);
        let completion_rate = if record.log.is_empty() {
            None
        } else {
            Some(f64::from(days_completed) / record.log.len() as f64)
        };

        // A report carrying neither flag nor note still yields a level
        // when there is history to rate.
        let engagement = engagement.or_else(|| completion_rate.map(classify::classify_by_rate));

        debug!(
            user = user_id,
            habit = %record.command.habit_id,
            days_completed,
            streak,
            "check-in recorded"
        );

        Ok(TrackerFeedback {
            habit_id: report.habit_id,
            days_completed,
            days_missed,
            streak,
            engagement,
            completion_rate,
        })
    }
}
