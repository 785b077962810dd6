//! Sqlite-backed profile store.
//!
//! One connection behind a mutex: every read-modify-write for a user id
//! is serialized, so racing turns for the same user cannot lose updates.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use sprig_core::traits::ProfileStore;
use sprig_core::types::{CoachingSession, UserProfile};
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;

pub struct SqliteProfileStore {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for SqliteProfileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteProfileStore").finish_non_exhaustive()
    }
}

impl SqliteProfileStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("opening profile db at {}", path.display()))?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;
        init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS profiles (
            user_id TEXT PRIMARY KEY,
            profile TEXT NOT NULL,
            session TEXT NOT NULL,
            updated_at INTEGER NOT NULL
        );
        ",
    )?;
    Ok(())
}

#[async_trait]
impl ProfileStore for SqliteProfileStore {
    async fn load(&self, user_id: &str) -> Result<Option<(UserProfile, CoachingSession)>> {
        let conn = self.conn.lock().expect("profile db mutex poisoned");
        let row: Option<(String, String)> = conn
            .query_row(
                "SELECT profile, session FROM profiles WHERE user_id = ?",
                params![user_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .with_context(|| format!("loading profile for {user_id}"))?;

        let Some((profile_json, session_json)) = row else {
            debug!(user = user_id, "no stored profile");
            return Ok(None);
        };

        let profile: UserProfile =
            serde_json::from_str(&profile_json).context("decoding stored profile")?;
        let session: CoachingSession =
            serde_json::from_str(&session_json).context("decoding stored session")?;
        Ok(Some((profile, session)))
    }

    async fn save(
        &self,
        user_id: &str,
        profile: &UserProfile,
        session: &CoachingSession,
    ) -> Result<()> {
        let profile_json = serde_json::to_string(profile).context("encoding profile")?;
        let session_json = serde_json::to_string(session).context("encoding session")?;
        let now_ms = Utc::now().timestamp_millis();

        let conn = self.conn.lock().expect("profile db mutex poisoned");
        conn.execute(
            "
            INSERT INTO profiles (user_id, profile, session, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(user_id)
            DO UPDATE SET
                profile = excluded.profile,
                session = excluded.session,
                updated_at = excluded.updated_at
            ",
            params![user_id, profile_json, session_json, now_ms],
        )
        .with_context(|| format!("saving profile for {user_id}"))?;
        Ok(())
    }
}
