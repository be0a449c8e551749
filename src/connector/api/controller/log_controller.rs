use anyhow::Result;

use crate::application::ExchangeLog;
use crate::domain::{LogEntry, MasterLog};

use super::super::Container;

const RESPONSE_PREVIEW_CHARS: usize = 80;

pub struct LogController<'a> {
    container: &'a Container,
}

impl<'a> LogController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn log(&self, conversation: Option<String>) -> Result<String> {
        let master = self.container.exchange_log().snapshot().await;
        Ok(match conversation {
            Some(id) => format_conversation(&master, &id),
            None => format_summary(&master),
        })
    }
}

fn format_summary(master: &MasterLog) -> String {
    if master.conversations().is_empty() {
        return "No exchanges logged.".to_string();
    }

    let mut output = format!(
        "Master log (project started {})\n{} entries across {} conversations:\n\n",
        master.project_start_time(),
        master.total_entries(),
        master.conversations().len()
    );
    for (id, entries) in master.conversations() {
        let ended = entries.last().is_some_and(LogEntry::is_conversation_end);
        output.push_str(&format!(
            "  {id}: {} entries{}\n",
            entries.len(),
            if ended { " (ended)" } else { "" }
        ));
    }
    output
}

fn format_conversation(master: &MasterLog, id: &str) -> String {
    let entries = master.entries(id);
    if entries.is_empty() {
        return format!("No entries for conversation {id}.");
    }

    let mut output = format!("Conversation {id} ({} entries):\n\n", entries.len());
    for (i, entry) in entries.iter().enumerate() {
        let response: String = entry.response().chars().take(RESPONSE_PREVIEW_CHARS).collect();
        output.push_str(&format!(
            "{}. {} [{}] {} messages -> {}\n",
            i + 1,
            entry.timestamp(),
            entry.module(),
            entry.messages().len(),
            response.replace('\n', " ")
        ));
    }
    output
}
