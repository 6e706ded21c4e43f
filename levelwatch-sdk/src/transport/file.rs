//! Spool-file transport.
//!
//! Appends each payload as one JSON line to a local file, for deployments
//! where a separate uploader ships the spool.
//!
//! Every line in the spool is a complete payload. A write that fails part
//! way is rolled back, and a torn tail left by a crash is cut off before the
//! next append.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use levelwatch_types::BatchPayload;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tracing::warn;

use super::Transport;
use crate::error::TransmitError;

const SCAN_CHUNK: usize = 4096;

/// Appends payloads as newline-delimited JSON and syncs after each write.
#[derive(Debug)]
pub struct FileTransport {
    path: PathBuf,
    description: String,
}

impl FileTransport {
    /// Create a transport appending to `path`. The file is created on first use.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self { path, description }
    }

    /// Returns the spool path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open the spool positioned after its last complete line.
    async fn open_spool(&self) -> std::io::Result<(File, u64)> {
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&self.path)
            .await?;

        let len = file.metadata().await?.len();
        let end = complete_len(&mut file, len).await?;
        if end < len {
            warn!(
                "spool {} ends in a partial line, dropping {} bytes",
                self.path.display(),
                len - end
            );
            file.set_len(end).await?;
        }

        file.seek(SeekFrom::Start(end)).await?;
        Ok((file, end))
    }
}

/// Length of the prefix of `file` that ends in a newline (0 if none does).
async fn complete_len(file: &mut File, len: u64) -> std::io::Result<u64> {
    let mut buf = vec![0u8; SCAN_CHUNK];
    let mut end = len;

    while end > 0 {
        let start = end.saturating_sub(SCAN_CHUNK as u64);
        let chunk = &mut buf[..(end - start) as usize];
        file.seek(SeekFrom::Start(start)).await?;
        file.read_exact(chunk).await?;

        if let Some(pos) = chunk.iter().rposition(|&b| b == b'\n') {
            return Ok(start + pos as u64 + 1);
        }
        end = start;
    }
    Ok(0)
}

async fn write_line(file: &mut File, line: &[u8]) -> std::io::Result<()> {
    file.write_all(line).await?;
    file.flush().await?;
    file.sync_data().await
}

#[async_trait]
impl Transport for FileTransport {
    async fn transmit(&mut self, payload: &BatchPayload) -> Result<(), TransmitError> {
        let mut line = serde_json::to_vec(payload)?;
        line.push(b'\n');

        let (mut file, end) = self.open_spool().await?;
        if let Err(e) = write_line(&mut file, &line).await {
            // Best effort; a leftover fragment is cut on the next attempt.
            let _ = file.set_len(end).await;
            return Err(e.into());
        }
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }
}
