use async_trait::async_trait;

use crate::domain::{DomainError, LogEntry, MasterLog};

/// Durable sink for exchange records.
#[async_trait]
pub trait ExchangeLog: Send + Sync {
    /// Persist `entry` under `conversation_id`. An error means the entry may
    /// not be on disk and must be surfaced to the caller.
    async fn record(&self, conversation_id: &str, entry: LogEntry) -> Result<(), DomainError>;

    /// Snapshot of everything recorded so far.
    async fn snapshot(&self) -> MasterLog;
}
