//! The per-user turn service.
//!
//! Each turn is: load state, run the engine, persist, dispatch any side
//! effect. Turns for the same user are serialized behind a keyed lock so
//! concurrent submissions cannot interleave; different users proceed
//! independently.

use crate::direct;
use anyhow::{Context, Result};
use sprig_coach::CoachEngine;
use sprig_core::traits::{HabitTracker, ProfileStore};
use sprig_core::types::{CheckinReport, CoachingSession, TurnInput, UserProfile};
use sprig_ipc::SubmitPayload;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{Instrument, debug, info, info_span};

/// What the transport hands back for one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CoachReply {
    pub text: String,
    pub streak: u32,
}

pub(crate) struct CoachService {
    coach_id: String,
    engine: CoachEngine,
    store: Arc<dyn ProfileStore>,
    tracker: Arc<dyn HabitTracker>,
    turn_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
    started_at: Instant,
}

impl std::fmt::Debug for CoachService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoachService")
            .field("coach_id", &self.coach_id)
            .finish_non_exhaustive()
    }
}

impl CoachService {
    pub(crate) fn new(
        coach_id: impl Into<String>,
        engine: CoachEngine,
        store: Arc<dyn ProfileStore>,
        tracker: Arc<dyn HabitTracker>,
    ) -> Self {
        Self {
            coach_id: coach_id.into(),
            engine,
            store,
            tracker,
            turn_locks: Mutex::new(HashMap::new()),
            started_at: Instant::now(),
        }
    }

    pub(crate) fn coach_id(&self) -> &str {
        &self.coach_id
    }

    /// Process one submission for a user.
    pub(crate) async fn submit(&self, user_id: &str, payload: SubmitPayload) -> Result<CoachReply> {
        let span = info_span!("coach_turn", user = %user_id);
        self.submit_inner(user_id, payload).instrument(span).await
    }

    async fn submit_inner(&self, user_id: &str, payload: SubmitPayload) -> Result<CoachReply> {
        let lock = self.turn_lock(user_id);
        let _guard = lock.lock().await;

        let stored = self
            .store
            .load(user_id)
            .await
            .with_context(|| format!("loading state for {user_id}"))?;
        let (mut profile, mut session) = stored.unwrap_or_else(|| {
            debug!(user = user_id, "first contact, creating profile");
            (UserProfile::default(), CoachingSession::default())
        });

        // Utility prompts short-circuit the coaching flow entirely.
        if let SubmitPayload::HabitInput { habit } = &payload
            && let Some(answer) = direct::direct_answer(habit)
        {
            debug!(user = user_id, "direct prompt answered");
            return Ok(CoachReply {
                text: answer.to_owned(),
                streak: streak_for(&session),
            });
        }

        let input = match payload {
            SubmitPayload::HabitInput { habit } => TurnInput::Message(habit),
            SubmitPayload::UserReport {
                habit_id,
                completed,
                note,
            } => {
                let report = CheckinReport {
                    habit_id,
                    completed,
                    note,
                };
                let feedback = self
                    .tracker
                    .record(user_id, report)
                    .await
                    .context("recording check-in with tracker")?;
                TurnInput::Feedback(feedback)
            }
        };

        let reply = self
            .engine
            .handle_turn(&mut profile, &mut session, input)
            .await;

        self.store
            .save(user_id, &profile, &session)
            .await
            .with_context(|| format!("saving state for {user_id}"))?;

        if let Some(command) = reply.side_effect {
            info!(user = user_id, habit = %command.habit_id, "registering habit with tracker");
            self.tracker
                .register(user_id, command)
                .await
                .context("registering habit with tracker")?;
        }

        Ok(CoachReply {
            text: reply.text,
            streak: streak_for(&session),
        })
    }

    /// Process liveness for the health endpoint.
    pub(crate) fn health(&self) -> (String, u64) {
        ("ok".to_owned(), self.started_at.elapsed().as_secs())
    }

    fn turn_lock(&self, user_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.turn_locks.lock().expect("turn lock map poisoned");
        Arc::clone(
            locks
                .entry(user_id.to_owned())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(()))),
        )
    }
}

/// Streak shown in replies: the latest tracker streak for the active
/// goal, zero when there is none yet.
fn streak_for(session: &CoachingSession) -> u32 {
    session
        .current_goal
        .as_deref()
        .and_then(|id| session.feedback.get(id))
        .map_or(0, |feedback| feedback.streak)
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::LocalTracker;
    use sprig_core::fakes::{FakeGenerator, MemoryProfileStore, RecordingTracker};
    use sprig_core::types::Stage;

    fn service() -> CoachService {
        CoachService::new(
            "sprig",
            CoachEngine::new(Arc::new(FakeGenerator::new("You've got this!"))),
            Arc::new(MemoryProfileStore::new()),
            Arc::new(LocalTracker::new()),
        )
    }

    fn service_with_tracker(tracker: Arc<dyn HabitTracker>) -> CoachService {
        CoachService::new(
            "sprig",
            CoachEngine::new(Arc::new(FakeGenerator::new("You've got this!"))),
            Arc::new(MemoryProfileStore::new()),
            tracker,
        )
    }

    fn message(text: &str) -> SubmitPayload {
        SubmitPayload::HabitInput {
            habit: text.to_owned(),
        }
    }

    fn report_done(habit_id: &str) -> SubmitPayload {
        SubmitPayload::UserReport {
            habit_id: habit_id.to_owned(),
            completed: Some(true),
            note: None,
        }
    }

    #[tokio::test]
    async fn full_conversation_from_onboarding_to_first_checkin() {
        let service = service();

        // Onboarding.
        let reply = service.submit("ada", message("hello")).await.unwrap();
        assert!(reply.text.contains("lifestyle"));
        service
            .submit("ada", message("I take long showers"))
            .await
            .unwrap();
        service.submit("ada", message("beginner")).await.unwrap();
        let proposal = service
            .submit("ada", message("water use bothers me"))
            .await
            .unwrap();
        assert!(proposal.text.contains("shorter shower"));

        // Confirmation registers the habit with the tracker.
        let confirmed = service.submit("ada", message("yes, I'm in")).await.unwrap();
        assert!(confirmed.text.contains("Habit logged"));
        assert_eq!(confirmed.streak, 0);

        // First completed check-in: tracker feedback flows back through
        // the engine and the reply carries the streak.
        let checkin = service
            .submit("ada", report_done("shorter_shower"))
            .await
            .unwrap();
        assert!(checkin.text.contains("+5 XP"));
        assert!(checkin.text.contains("Water Saver"));
        assert_eq!(checkin.streak, 1);
    }

    #[tokio::test]
    async fn state_persists_between_submissions() {
        let store = Arc::new(MemoryProfileStore::new());
        let service = CoachService::new(
            "sprig",
            CoachEngine::new(Arc::new(FakeGenerator::new("go!"))),
            Arc::<MemoryProfileStore>::clone(&store),
            Arc::new(LocalTracker::new()),
        );

        service.submit("ada", message("hi")).await.unwrap();
        let (_, session) = store.load("ada").await.unwrap().unwrap();
        assert_eq!(session.stage, Stage::OnboardingQ1);

        service.submit("ada", message("I drive a lot")).await.unwrap();
        let (profile, session) = store.load("ada").await.unwrap().unwrap();
        assert_eq!(session.stage, Stage::OnboardingQ2);
        assert_eq!(profile.commute.as_deref(), Some("I drive a lot"));
    }

    #[tokio::test]
    async fn register_command_reaches_the_tracker() {
        let tracker = Arc::new(RecordingTracker::new());
        let service = service_with_tracker(Arc::<RecordingTracker>::clone(&tracker));

        service.submit("ada", message("hello")).await.unwrap();
        service.submit("ada", message("I drive everywhere")).await.unwrap();
        service.submit("ada", message("beginner")).await.unwrap();
        service
            .submit("ada", message("I struggle with plastic bags"))
            .await
            .unwrap();
        service.submit("ada", message("yes")).await.unwrap();

        let registered = tracker.take_registered();
        assert_eq!(registered.len(), 1);
        let (user, command) = &registered[0];
        assert_eq!(user, "ada");
        assert_eq!(command.habit_id, "reusable_shopping_bag");
        assert_eq!(command.target_days, 1);
        assert_eq!(command.tracking_window_days, 3);
    }

    #[tokio::test]
    async fn direct_prompts_bypass_the_state_machine() {
        let store = Arc::new(MemoryProfileStore::new());
        let service = CoachService::new(
            "sprig",
            CoachEngine::new(Arc::new(FakeGenerator::new("go!"))),
            Arc::<MemoryProfileStore>::clone(&store),
            Arc::new(LocalTracker::new()),
        );

        let reply = service.submit("ada", message("eco tip")).await.unwrap();
        assert!(reply.text.contains("phantom"));
        assert!(
            store.load("ada").await.unwrap().is_none(),
            "direct prompts must not create coaching state"
        );
    }

    #[tokio::test]
    async fn users_are_coached_independently() {
        let service = service();

        service.submit("ada", message("hello")).await.unwrap();
        service.submit("ada", message("I drive everywhere")).await.unwrap();

        // Ben's first message starts his own onboarding, unaffected by Ada.
        let reply = service.submit("ben", message("hello")).await.unwrap();
        assert!(reply.text.contains("lifestyle"));
    }

    #[tokio::test]
    async fn feedback_reply_streak_matches_tracker_history() {
        let service = service();

        service.submit("ada", message("hello")).await.unwrap();
        service.submit("ada", message("long showers")).await.unwrap();
        service.submit("ada", message("beginner")).await.unwrap();
        service.submit("ada", message("shower time")).await.unwrap();
        service.submit("ada", message("yes")).await.unwrap();

        service
            .submit("ada", report_done("shorter_shower"))
            .await
            .unwrap();
        let second = service
            .submit("ada", report_done("shorter_shower"))
            .await
            .unwrap();
        assert_eq!(second.streak, 2);

        let missed = service
            .submit("ada", SubmitPayload::UserReport {
                habit_id: "shorter_shower".to_owned(),
                completed: Some(false),
                note: None,
            })
            .await
            .unwrap();
        assert_eq!(missed.streak, 0, "a miss resets the streak");
        assert!(missed.text.contains("fresh start"));
    }

    #[tokio::test]
    async fn coaching_survives_a_gateway_restart() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("profiles.db");

        {
            let store = Arc::new(sprig_memory::SqliteProfileStore::open(&db_path).unwrap());
            let service = CoachService::new(
                "sprig",
                CoachEngine::new(Arc::new(FakeGenerator::new("go!"))),
                store,
                Arc::new(LocalTracker::new()),
            );
            service.submit("ada", message("hello")).await.unwrap();
            service
                .submit("ada", message("I take long showers"))
                .await
                .unwrap();
        }

        // A fresh service over the same db resumes mid-onboarding.
        let store = Arc::new(sprig_memory::SqliteProfileStore::open(&db_path).unwrap());
        let service = CoachService::new(
            "sprig",
            CoachEngine::new(Arc::new(FakeGenerator::new("go!"))),
            store,
            Arc::new(LocalTracker::new()),
        );
        let reply = service.submit("ada", message("beginner")).await.unwrap();
        assert!(
            reply.text.contains("goals or daily challenges"),
            "should be asking the third onboarding question, got: {}",
            reply.text
        );
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let service = service();
        let (status, _uptime) = service.health();
        assert_eq!(status, "ok");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn concurrent_turns_for_one_user_are_serialized() {
        let service = Arc::new(service());

        let mut handles = Vec::new();
        for _ in 0..4 {
            let service = Arc::clone(&service);
            handles.push(tokio::spawn(async move {
                service.submit("ada", message("hello hello hello")).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        // Four serialized turns walk the onboarding stages one at a time;
        // interleaved turns would have lost updates instead.
        let reply = service.submit("ada", message("yes")).await.unwrap();
        assert!(!reply.text.is_empty());
    }
}
