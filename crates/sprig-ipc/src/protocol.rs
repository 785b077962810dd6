use serde::{Deserialize, Serialize};

pub const PROTOCOL_VERSION: u32 = 1;

/// One submitted turn: a plain coaching message or a daily report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubmitPayload {
    /// Free-text message from the user (habit description, onboarding
    /// answer, goal confirmation, check-in chat).
    HabitInput { habit: String },
    /// Report on how the active goal went. `completed` is the structured
    /// flag; `note` is a free-text status classified server-side.
    UserReport {
        habit_id: String,
        #[serde(default)]
        completed: Option<bool>,
        #[serde(default)]
        note: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Hello {
        version: u32,
    },
    Submit {
        user_id: String,
        #[serde(flatten)]
        payload: SubmitPayload,
    },
    Health,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Hello {
        version: u32,
        coach_id: String,
    },
    /// The coach's reply to a submission.
    Reply {
        user_id: String,
        text: String,
        streak: u32,
    },
    Health {
        status: String,
        uptime_secs: u64,
    },
    Error {
        message: String,
    },
}
