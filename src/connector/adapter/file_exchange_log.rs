use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::application::ExchangeLog;
use crate::domain::{DomainError, LogEntry, MasterLog};

pub const CONVERSATIONS_DIR: &str = "conversations";
pub const MASTER_LOG_FILE: &str = "master_conversation_log.json";

/// [`ExchangeLog`] writing two copies of every entry:
///
/// - `<root>/conversations/conversation_<id>_<timestamp>.json`, one file per entry
/// - `<root>/master_conversation_log.json`, the whole [`MasterLog`], rewritten
///   on every entry via a temp file and rename
///
/// The master log is loaded once by [`FileExchangeLog::open`]. A master log
/// that exists but does not parse is an error; it is never replaced silently.
/// Only one writer per root directory is supported.
pub struct FileExchangeLog {
    conversations_dir: PathBuf,
    master_path: PathBuf,
    master: Mutex<MasterLog>,
}

impl FileExchangeLog {
    pub fn open(root: impl AsRef<Path>) -> Result<Self, DomainError> {
        let root = root.as_ref();
        let conversations_dir = root.join(CONVERSATIONS_DIR);
        fs::create_dir_all(&conversations_dir)?;

        let master_path = root.join(MASTER_LOG_FILE);
        let master = Self::load_or_create(&master_path)?;

        Ok(Self {
            conversations_dir,
            master_path,
            master: Mutex::new(master),
        })
    }

    fn load_or_create(path: &Path) -> Result<MasterLog, DomainError> {
        if !path.exists() {
            debug!("No master log at {}, starting a new one", path.display());
            return Ok(MasterLog::new());
        }

        let content = fs::read_to_string(path)?;
        let master: MasterLog = serde_json::from_str(&content)
            .map_err(|e| DomainError::log_corrupt(format!("{}: {e}", path.display())))?;
        info!(
            "Loaded master log with {} entries across {} conversations",
            master.total_entries(),
            master.conversations().len()
        );
        Ok(master)
    }

    pub fn master_log_path(&self) -> &Path {
        &self.master_path
    }

    pub fn conversations_dir(&self) -> &Path {
        &self.conversations_dir
    }

    /// Write `entry` to its own file. Never overwrites: a name taken by an
    /// earlier entry in the same second gets a `_2`, `_3`, ... suffix.
    async fn write_entry_file(
        &self,
        conversation_id: &str,
        entry: &LogEntry,
    ) -> Result<PathBuf, DomainError> {
        let stem = format!(
            "conversation_{}_{}",
            file_safe(conversation_id),
            entry.timestamp()
        );
        let content = serde_json::to_string_pretty(entry)?;

        for n in 1u32.. {
            let name = if n == 1 {
                format!("{stem}.json")
            } else {
                format!("{stem}_{n}.json")
            };
            let path = self.conversations_dir.join(name);
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(mut file) => {
                    file.write_all(content.as_bytes()).await?;
                    file.flush().await?;
                    return Ok(path);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }
        unreachable!("u32 range exhausted while naming log entry files")
    }

    /// Replace the master log on disk. A failed attempt leaves neither a
    /// partial master log nor the temp file behind.
    async fn save_master(&self, master: &MasterLog) -> Result<(), DomainError> {
        let tmp_path = self.master_path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(master)?;
        if let Err(e) = replace_file(&tmp_path, &self.master_path, content).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }
        Ok(())
    }
}

async fn replace_file(tmp_path: &Path, path: &Path, content: String) -> std::io::Result<()> {
    tokio::fs::write(tmp_path, content).await?;
    tokio::fs::rename(tmp_path, path).await
}

/// Conversation ids are caller-supplied; keep them from escaping the log dir.
fn file_safe(id: &str) -> String {
    id.chars()
        .map(|c| if c == '/' || c == '\\' || c == ':' { '_' } else { c })
        .collect()
}

#[async_trait]
impl ExchangeLog for FileExchangeLog {
    async fn record(&self, conversation_id: &str, entry: LogEntry) -> Result<(), DomainError> {
        let mut master = self.master.lock().await;

        let path = self.write_entry_file(conversation_id, &entry).await?;
        let mut updated = master.clone();
        updated.append(conversation_id, entry);
        if let Err(e) = self.save_master(&updated).await {
            // A failed record leaves nothing behind.
            warn!("Failed to save master log, discarding {}: {e}", path.display());
            let _ = tokio::fs::remove_file(&path).await;
            return Err(e);
        }
        *master = updated;

        debug!("Recorded exchange for {conversation_id} at {}", path.display());
        Ok(())
    }

    async fn snapshot(&self) -> MasterLog {
        self.master.lock().await.clone()
    }
}
