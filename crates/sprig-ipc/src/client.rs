use crate::protocol::{ClientMessage, ServerMessage};
use anyhow::{Context, Result};
use std::path::Path;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::UnixStream;
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};

#[allow(missing_debug_implementations)]
pub struct IpcClient {
    reader: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl IpcClient {
    pub async fn connect(socket_path: &Path) -> Result<Self> {
        let stream = UnixStream::connect(socket_path)
            .await
            .with_context(|| format!("failed to connect to {}", socket_path.display()))?;
        let (read_half, write_half) = stream.into_split();

        Ok(Self {
            reader: BufReader::new(read_half).lines(),
            writer: write_half,
        })
    }

    pub async fn send(&mut self, message: ClientMessage) -> Result<()> {
        let encoded = serde_json::to_string(&message).context("failed to encode client message")?;
        self.writer
            .write_all(encoded.as_bytes())
            .await
            .context("failed to write client message")?;
        self.writer
            .write_all(b"\n")
            .await
            .context("failed to write message delimiter")?;
        self.writer
            .flush()
            .await
            .context("failed to flush client message")?;
        Ok(())
    }

    pub async fn recv(&mut self) -> Result<ServerMessage> {
        loop {
            let line = self
                .reader
                .next_line()
                .await
                .context("failed to read server message")?
                .ok_or_else(|| anyhow::anyhow!("ipc connection closed"))?;

            if line.trim().is_empty() {
                continue;
            }

            return serde_json::from_str(&line).context("failed to decode server message");
        }
    }

    /// One request/response exchange.
    pub async fn round_trip(&mut self, message: ClientMessage) -> Result<ServerMessage> {
        self.send(message).await?;
        self.recv().await
    }
}
