//! Newline-delimited JSON framing over byte streams.
//!
//! # Responsibilities
//! - Decode one message per line from child stdout / parent stdin
//! - Encode and flush one message per line
//! - Give each writer a single owning task so frames never interleave
//!
//! # Design Decisions
//! - A line that fails to decode is dropped and logged; the stream continues
//! - EOF ends the reader (`Ok(None)`); only I/O failures are errors

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, Lines};
use tokio::sync::mpsc;

#[derive(Debug, Error)]
pub enum IpcError {
    #[error("IPC I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("IPC encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

pub struct FrameReader<R> {
    lines: Lines<BufReader<R>>,
    label: &'static str,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    pub fn new(reader: R, label: &'static str) -> Self {
        Self {
            lines: BufReader::new(reader).lines(),
            label,
        }
    }

    /// Next decodable message, or `None` at end of stream.
    pub async fn next<T: DeserializeOwned>(&mut self) -> Result<Option<T>, IpcError> {
        while let Some(line) = self.lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(message) => return Ok(Some(message)),
                Err(e) => tracing::debug!(channel = self.label, error = %e, "Dropping malformed IPC frame"),
            }
        }
        Ok(None)
    }
}

/// Write one frame followed by a newline, then flush.
pub async fn write_frame<W, T>(writer: &mut W, message: &T) -> Result<(), IpcError>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let mut line = serde_json::to_vec(message)?;
    line.push(b'\n');
    writer.write_all(&line).await?;
    writer.flush().await?;
    Ok(())
}

/// Spawn a task that owns `writer` and writes every message sent on the
/// returned channel. The task ends when all senders drop or a write fails.
pub fn spawn_writer<W, T>(mut writer: W, label: &'static str) -> mpsc::UnboundedSender<T>
where
    W: AsyncWrite + Unpin + Send + 'static,
    T: Serialize + Send + Sync + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<T>();
    tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if let Err(e) = write_frame(&mut writer, &message).await {
                tracing::warn!(channel = label, error = %e, "IPC writer failed");
                break;
            }
        }
        tracing::debug!(channel = label, "IPC writer stopped");
    });
    tx
}
