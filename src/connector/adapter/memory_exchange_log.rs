use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::application::ExchangeLog;
use crate::domain::{DomainError, LogEntry, MasterLog};

/// [`ExchangeLog`] that only keeps entries in memory.
pub struct MemoryExchangeLog {
    master: Mutex<MasterLog>,
}

impl MemoryExchangeLog {
    pub fn new() -> Self {
        Self {
            master: Mutex::new(MasterLog::new()),
        }
    }
}

impl Default for MemoryExchangeLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExchangeLog for MemoryExchangeLog {
    async fn record(&self, conversation_id: &str, entry: LogEntry) -> Result<(), DomainError> {
        let mut master = self.master.lock().await;
        master.append(conversation_id, entry);
        debug!("Recorded exchange for {conversation_id} in memory");
        Ok(())
    }

    async fn snapshot(&self) -> MasterLog {
        self.master.lock().await.clone()
    }
}
