use std::collections::BTreeMap;

use chrono::Local;
use serde::{Deserialize, Serialize};

use super::Message;

/// Format shared by conversation ids, log entry timestamps and log file names.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Log key for completions that are not part of a conversation.
pub const SINGLE_INTERACTION_KEY: &str = "single_interaction";

/// Response recorded when a conversation is ended.
pub const CONVERSATION_ENDED: &str = "CONVERSATION_ENDED";

pub fn timestamp_now() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// One recorded exchange. Never modified after it is written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    module: String,
    timestamp: String,
    messages: Vec<Message>,
    response: String,
}

impl LogEntry {
    pub fn new(module: impl Into<String>, messages: Vec<Message>, response: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            timestamp: timestamp_now(),
            messages,
            response: response.into(),
        }
    }

    /// Reconstitutes from persisted data (used by adapters and tests).
    pub fn reconstitute(
        module: String,
        timestamp: String,
        messages: Vec<Message>,
        response: String,
    ) -> Self {
        Self {
            module,
            timestamp,
            messages,
            response,
        }
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn response(&self) -> &str {
        &self.response
    }

    pub fn is_conversation_end(&self) -> bool {
        self.response == CONVERSATION_ENDED
    }
}

/// Cumulative record of every exchange, keyed by conversation id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterLog {
    project_start_time: String,
    conversations: BTreeMap<String, Vec<LogEntry>>,
}

impl MasterLog {
    pub fn new() -> Self {
        Self {
            project_start_time: timestamp_now(),
            conversations: BTreeMap::new(),
        }
    }

    pub fn project_start_time(&self) -> &str {
        &self.project_start_time
    }

    pub fn conversations(&self) -> &BTreeMap<String, Vec<LogEntry>> {
        &self.conversations
    }

    pub fn entries(&self, conversation_id: &str) -> &[LogEntry] {
        self.conversations
            .get(conversation_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn total_entries(&self) -> usize {
        self.conversations.values().map(Vec::len).sum()
    }

    pub fn append(&mut self, conversation_id: &str, entry: LogEntry) {
        self.conversations
            .entry(conversation_id.to_string())
            .or_default()
            .push(entry);
    }
}

impl Default for MasterLog {
    fn default() -> Self {
        Self::new()
    }
}
