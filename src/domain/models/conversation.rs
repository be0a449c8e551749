use std::collections::HashMap;

use super::{timestamp_now, Message};

/// In-memory histories of the live conversations, keyed by id.
///
/// Histories only grow while a conversation is live; `clear` and
/// `clear_all` are the only ways to shrink them.
#[derive(Debug, Default)]
pub struct Conversations {
    histories: HashMap<String, Vec<Message>>,
}

impl Conversations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new conversation with an empty history and returns its id.
    ///
    /// Ids are creation timestamps; a second conversation started within the
    /// same second gets a `_2`, `_3`, ... suffix.
    pub fn start(&mut self) -> String {
        let id = self.unique_id(&timestamp_now());
        self.histories.insert(id.clone(), Vec::new());
        id
    }

    fn unique_id(&self, base: &str) -> String {
        if !self.histories.contains_key(base) {
            return base.to_string();
        }
        (2..)
            .map(|n| format!("{base}_{n}"))
            .find(|candidate| !self.histories.contains_key(candidate))
            .unwrap_or_else(|| base.to_string())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.histories.contains_key(id)
    }

    pub fn history(&self, id: &str) -> Vec<Message> {
        self.histories.get(id).cloned().unwrap_or_default()
    }

    /// Stored history followed by `messages`. Unknown ids are registered
    /// with an empty history first.
    pub fn outbound(&mut self, id: &str, messages: &[Message]) -> Vec<Message> {
        let history = self.histories.entry(id.to_string()).or_default();
        history.iter().chain(messages).cloned().collect()
    }

    /// Appends one completed turn and returns the new history length.
    pub fn append_turn(&mut self, id: &str, prompt: Message, response: Message) -> usize {
        let history = self.histories.entry(id.to_string()).or_default();
        history.push(prompt);
        history.push(response);
        history.len()
    }

    /// Empties one history. Returns `false` for unknown ids.
    pub fn clear(&mut self, id: &str) -> bool {
        match self.histories.get_mut(id) {
            Some(history) => {
                history.clear();
                true
            }
            None => false,
        }
    }

    pub fn clear_all(&mut self) {
        self.histories.clear();
    }

    pub fn remove(&mut self, id: &str) -> Option<Vec<Message>> {
        self.histories.remove(id)
    }

    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.histories.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.histories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.histories.is_empty()
    }
}
