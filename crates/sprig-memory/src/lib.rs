//! Persistent profile storage for sprig.

mod sqlite;

pub use sqlite::SqliteProfileStore;
