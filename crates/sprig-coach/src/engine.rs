//! The coaching state machine.
//!
//! `CoachEngine::handle_turn` is total over every (stage, input kind)
//! pair: tracker feedback is folded in regardless of stage, broken state
//! recovers by restarting onboarding, and a generation outage degrades to
//! canned copy. No turn ever fails.

use crate::catalog::GoalCatalog;
use crate::selector::{self, Selection};
use crate::{classify, ledger, tone};
use chrono::Utc;
use sprig_core::traits::TextGenerator;
use sprig_core::types::{
    CoachingSession, EngagementLevel, MicroGoal, RegisterHabit, Stage, TrackerFeedback, TurnInput,
    TurnReply, UserProfile,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Tracking parameters sent with every habit registration.
const TARGET_DAYS: u32 = 1;
const TRACKING_WINDOW_DAYS: u32 = 3;

/// Shown during onboarding when the user opens with a greeting instead of
/// a habit they want to change.
const SUGGESTED_HABITS: &[&str] = &[
    "I drive to nearby places",
    "I use plastic bags regularly",
    "I leave lights on unnecessarily",
    "I buy bottled water daily",
    "I take long showers",
];

/// Substituted for the generated encouragement line when the
/// text-generation service is unavailable.
const GENERATION_FALLBACK: &str =
    "(I'm sorry, my AI brain is a little busy right now — the goal above still stands!)";

/// Orchestrates one coaching conversation turn at a time.
pub struct CoachEngine {
    catalog: GoalCatalog,
    generator: Arc<dyn TextGenerator>,
}

impl std::fmt::Debug for CoachEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoachEngine")
            .field("generator", &self.generator.name())
            .finish_non_exhaustive()
    }
}

impl CoachEngine {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            catalog: GoalCatalog::new(),
            generator,
        }
    }

    pub fn catalog(&self) -> &GoalCatalog {
        &self.catalog
    }

    /// Process one incoming turn, mutating profile and session in place.
    pub async fn handle_turn(
        &self,
        profile: &mut UserProfile,
        session: &mut CoachingSession,
        input: TurnInput,
    ) -> TurnReply {
        let mut reply = match input {
            // Tracker feedback always wins over stage-based dialogue.
            TurnInput::Feedback(feedback) => self.fold_feedback(profile, session, feedback),
            TurnInput::Message(text) => match session.stage {
                Stage::Initial => start_onboarding(session, &text),
                Stage::OnboardingQ1 => {
                    profile.commute = Some(text);
                    session.stage = Stage::OnboardingQ2;
                    TurnReply::text(
                        "Thanks! How would you describe your awareness of environmental \
                         issues — beginner, curious, or seasoned?",
                    )
                }
                Stage::OnboardingQ2 => {
                    profile.eco_awareness = Some(text);
                    session.stage = Stage::OnboardingQ3;
                    TurnReply::text(
                        "Got it. Last one: what green goals or daily challenges are on \
                         your mind? (e.g. plastic waste, energy bills, food habits)",
                    )
                }
                Stage::OnboardingQ3 => self.finish_onboarding(profile, session, text).await,
                Stage::GoalProposed => self.confirm_goal(session, &text),
                Stage::GoalProposedRenegotiate => {
                    self.renegotiate(profile, session, &text).await
                }
                Stage::DailyCheckin => self.checkin_chat(session, &text),
                Stage::AllGoalsCompleted => TurnReply::text(
                    "You've tackled every goal in my book! Want to revisit one of your \
                     past habits, or go deeper on one you've already built?",
                ),
                Stage::Unknown => {
                    warn!(stage = ?session.stage, "unrecognized stage, restarting onboarding");
                    session.stage = Stage::Initial;
                    TurnReply::text(
                        "I lost my place in our conversation, sorry about that. Let's \
                         start over: say hi whenever you're ready.",
                    )
                }
            },
        };

        reply.text = tone::apply(tone::tone_for(profile), &reply.text);
        reply
    }

    /// Fold a tracker report into profile and session, forcing the
    /// conversation back to the daily check-in stage.
    fn fold_feedback(
        &self,
        profile: &mut UserProfile,
        session: &mut CoachingSession,
        feedback: TrackerFeedback,
    ) -> TurnReply {
        // Malformed reports without an engagement level get missed-style
        // handling instead of being rejected.
        let engagement = feedback.engagement.unwrap_or(EngagementLevel::Missed);
        debug!(habit = %feedback.habit_id, ?engagement, streak = feedback.streak, "tracker feedback");

        let text = match engagement {
            EngagementLevel::Completed if feedback.days_completed > 0 => {
                self.celebrate(profile, &feedback)
            }
            EngagementLevel::Missed => {
                "No guilt — everyone slips, and tomorrow is a fresh start. What got in \
                 the way today? If the goal feels too big, we can shrink it together."
                    .to_owned()
            }
            EngagementLevel::Struggling => {
                "Thanks for being honest — that's how habits actually stick. What's the \
                 one specific obstacle that makes this hard?"
                    .to_owned()
            }
            _ => format!(
                "Progress noted — you're on a {}-day streak. Keep me posted!",
                feedback.streak
            ),
        };

        session.feedback.insert(feedback.habit_id.clone(), feedback);
        session.stage = Stage::DailyCheckin;
        TurnReply::text(text)
    }

    fn celebrate(&self, profile: &mut UserProfile, feedback: &TrackerFeedback) -> String {
        let Some(goal) = self.catalog.get(&feedback.habit_id) else {
            warn!(habit = %feedback.habit_id, "completed habit not in catalog, skipping award");
            return format!(
                "Fantastic — that's {} day(s) of action on \"{}\". How did it feel?",
                feedback.days_completed, feedback.habit_id
            );
        };

        let outcome = ledger::award(profile, goal);
        profile.record_completed(goal.id);

        let mut text = format!(
            "Fantastic! You completed \"{}\" — that's +{} XP and a {}-day streak.",
            goal.description, outcome.xp_gained, feedback.streak
        );
        if let Some(level) = outcome.level_up {
            text.push_str(&format!(" 🌟 LEVEL UP! You're now a {level}!"));
        }
        if let Some(badge) = outcome.badge {
            text.push_str(&format!(" 🎖️ New badge earned: {badge}!"));
        }
        text.push_str(" What part of it felt most worthwhile?");
        text
    }

    /// Final onboarding answer: derive profile tags, pick a goal, propose it.
    async fn finish_onboarding(
        &self,
        profile: &mut UserProfile,
        session: &mut CoachingSession,
        text: String,
    ) -> TurnReply {
        profile.goals_challenges = Some(text);

        let all_answers = [
            profile.commute.as_deref().unwrap_or(""),
            profile.eco_awareness.as_deref().unwrap_or(""),
            profile.goals_challenges.as_deref().unwrap_or(""),
        ]
        .join(" ");
        profile.age_group = classify::derive_age_group(&all_answers);
        profile.motivation = classify::derive_motivation(&all_answers);

        let preference = format!(
            "{} {}",
            profile.commute.as_deref().unwrap_or(""),
            profile.goals_challenges.as_deref().unwrap_or("")
        );

        match selector::select_next(&self.catalog, profile, &preference) {
            Selection::Exhausted => {
                session.current_goal = None;
                session.stage = Stage::AllGoalsCompleted;
                TurnReply::text(
                    "Incredible — you've already tackled every micro-goal I have! Want \
                     to revisit a past habit, or go deeper on one of them?",
                )
            }
            Selection::Goal(goal) => {
                session.current_goal = Some(goal.id.to_owned());
                session.stage = Stage::GoalProposed;
                TurnReply::text(self.propose(goal).await)
            }
        }
    }

    /// Compose a goal proposal: description, rationale, a generated
    /// encouragement line, and the confirmation ask.
    async fn propose(&self, goal: &MicroGoal) -> String {
        let prompt = format!(
            "You are a friendly, encouraging sustainability coach. In one short \
             sentence (under 25 words), encourage the user to try this micro-goal \
             today: \"{}\". Address the user directly.",
            goal.description
        );
        let pitch = match self.generator.generate(&prompt).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_owned(),
            Ok(_) => GENERATION_FALLBACK.to_owned(),
            Err(error) => {
                warn!(generator = self.generator.name(), error = %error, "generation failed, using canned pitch");
                GENERATION_FALLBACK.to_owned()
            }
        };

        format!(
            "Here's today's micro-goal:\n\n✨ {}\n\nWhy it matters: {}\n\n{pitch}\n\n\
             Does this work for you? (yes / no)",
            goal.description, goal.rationale
        )
    }

    /// Reply at `goal_proposed`: confirm and register, or renegotiate.
    fn confirm_goal(&self, session: &mut CoachingSession, text: &str) -> TurnReply {
        if !classify::affirms(text) {
            session.stage = Stage::GoalProposedRenegotiate;
            return TurnReply::text(
                "That's completely fine. Would you like an alternative goal, or tell me \
                 what doesn't fit and we'll adjust?",
            );
        }

        let Some(goal) = session
            .current_goal
            .as_deref()
            .and_then(|id| self.catalog.get(id))
        else {
            // Confirmed with no active goal: broken state, restart cleanly.
            warn!("goal confirmed but no current goal set, resetting conversation");
            session.current_goal = None;
            session.stage = Stage::Initial;
            return TurnReply::text(
                "Hmm, I seem to have lost track of the goal we were discussing. Let's \
                 start fresh — say hi whenever you're ready.",
            );
        };

        session.stage = Stage::DailyCheckin;
        let command = RegisterHabit {
            habit_id: goal.id.to_owned(),
            description: goal.description.to_owned(),
            target_days: TARGET_DAYS,
            tracking_window_days: TRACKING_WINDOW_DAYS,
            start_date: Utc::now().date_naive(),
        };
        TurnReply::with_side_effect(
            format!(
                "🎉 Habit logged! I'll be tracking \"{}\" and will check in to see how \
                 it's going.",
                goal.description
            ),
            command,
        )
    }

    /// Reply at `goal_proposed_renegotiate`.
    async fn renegotiate(
        &self,
        profile: &UserProfile,
        session: &mut CoachingSession,
        text: &str,
    ) -> TurnReply {
        if classify::wants_alternative(text) {
            let current = session.current_goal.as_deref().unwrap_or("");
            if let Some(goal) = selector::select_alternative(&self.catalog, profile, current) {
                session.current_goal = Some(goal.id.to_owned());
                session.stage = Stage::GoalProposed;
                return TurnReply::text(format!("No problem! {}", self.propose(goal).await));
            }

            session.current_goal = None;
            session.stage = Stage::OnboardingQ3;
            return TurnReply::text(
                "I'm out of alternatives for now — tell me more about what you're \
                 interested in, and I'll find a better fit.",
            );
        }

        session.stage = Stage::OnboardingQ3;
        TurnReply::text(
            "Let's step back for a second: what matters most to you about living more \
             sustainably? Your answer helps me pick something that actually fits.",
        )
    }

    /// Plain message while in `daily_checkin` (no tracker report attached).
    fn checkin_chat(&self, session: &CoachingSession, text: &str) -> TurnReply {
        let description = session
            .current_goal
            .as_deref()
            .and_then(|id| self.catalog.get(id))
            .map_or("your current goal", |goal| goal.description);

        if classify::is_reflection(text) {
            TurnReply::text(format!(
                "Reflection is half the habit. Thinking about \"{description}\" — what \
                 felt different today compared to yesterday?"
            ))
        } else {
            TurnReply::text(format!(
                "Quick check-in: how is \"{description}\" going today? Done, missed, or \
                 somewhere in between?"
            ))
        }
    }
}

/// First contact: greet and ask the lifestyle/commute question.
fn start_onboarding(session: &mut CoachingSession, text: &str) -> TurnReply {
    session.stage = Stage::OnboardingQ1;

    let lowered = text.trim().to_lowercase();
    let wants_ideas = lowered.is_empty()
        || lowered.contains("start")
        || lowered.contains("journey")
        || lowered.split_whitespace().count() < 3;

    let mut greeting = String::from(
        "👋 Welcome! I'm your sustainability coach. First, how would you describe \
         your current lifestyle and how you usually get around?",
    );
    if wants_ideas {
        greeting.push_str("\n\nSome ideas to get you thinking:\n");
        for habit in SUGGESTED_HABITS {
            greeting.push_str(&format!("- {habit}\n"));
        }
    }
    TurnReply::text(greeting)
}
