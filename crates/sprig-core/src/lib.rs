pub mod fakes;
pub mod traits;
pub mod types;

pub use traits::{HabitTracker, ProfileStore, TextGenerator};
pub use types::{
    AgeGroup, CheckinReport, CoachingSession, EngagementLevel, GoalCategory, MicroGoal,
    MotivationLevel, RegisterHabit, Stage, TrackerFeedback, TurnInput, TurnReply, UserProfile,
};
