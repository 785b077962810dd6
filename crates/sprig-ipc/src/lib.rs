pub mod client;
pub mod protocol;
pub mod server;

pub use client::IpcClient;
pub use protocol::{ClientMessage, PROTOCOL_VERSION, ServerMessage, SubmitPayload};
pub use server::{IpcConnection, IpcServer};

use std::path::PathBuf;

pub fn socket_path(coach_id: &str) -> PathBuf {
    let runtime_dir = std::env::var("XDG_RUNTIME_DIR").ok();
    socket_path_with_runtime_dir(coach_id, runtime_dir.as_deref())
}

fn socket_path_with_runtime_dir(coach_id: &str, runtime_dir: Option<&str>) -> PathBuf {
    let safe_coach_id: String = coach_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_') {
                c
            } else {
                '-'
            }
        })
        .collect();

    if let Some(runtime_dir) = runtime_dir
        && !runtime_dir.is_empty()
    {
        return PathBuf::from(runtime_dir)
            .join("sprig")
            .join(format!("{safe_coach_id}.sock"));
    }

    PathBuf::from(format!("/tmp/sprig-{safe_coach_id}.sock"))
}
