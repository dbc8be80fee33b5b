//! Append-only JSON-lines result log.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use super::{BattleRecord, RepositoryError, Result, ResultSink};

/// Writes one JSON object per finished battle, one per line.
///
/// Writes are serialized through an internal lock so concurrent sessions never
/// interleave partial lines.
pub struct JsonLinesResultSink {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonLinesResultSink {
    /// Targets `path`, creating parent directories. Existing content is kept.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        tracing::debug!("result log at {}", path.display());
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every record back, in write order.
    pub fn load(path: impl AsRef<Path>) -> Result<Vec<BattleRecord>> {
        let contents = match std::fs::read_to_string(path.as_ref()) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        contents
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(index, line)| {
                serde_json::from_str(line).map_err(|err| RepositoryError::CorruptedData {
                    line: index + 1,
                    reason: err.to_string(),
                })
            })
            .collect()
    }
}

#[async_trait]
impl ResultSink for JsonLinesResultSink {
    async fn record(&self, record: &BattleRecord) -> Result<()> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let _guard = self.write_lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;
        Ok(())
    }
}
