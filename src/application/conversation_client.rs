use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{error, info, info_span, Dispatch};

use crate::application::{ChatClient, ExchangeLog};
use crate::domain::{
    Conversations, DomainError, LogEntry, Message, CONVERSATION_ENDED, SINGLE_INTERACTION_KEY,
};

pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Characters of the prompt echoed into the diagnostic log.
const PROMPT_PREVIEW_CHARS: usize = 100;

/// Mediates access to a completion endpoint, keeps per-conversation history
/// and records every exchange to an [`ExchangeLog`].
///
/// Diagnostics are emitted through the client's own [`Dispatch`], so several
/// clients in one process each write to their own diagnostic sink.
pub struct ConversationClient {
    module: String,
    chat_client: Arc<dyn ChatClient>,
    exchange_log: Arc<dyn ExchangeLog>,
    conversations: Mutex<Conversations>,
    diagnostics: Dispatch,
}

impl ConversationClient {
    pub fn new(
        module: impl Into<String>,
        chat_client: Arc<dyn ChatClient>,
        exchange_log: Arc<dyn ExchangeLog>,
    ) -> Self {
        Self {
            module: module.into(),
            chat_client,
            exchange_log,
            conversations: Mutex::new(Conversations::new()),
            diagnostics: tracing::dispatcher::get_default(Dispatch::clone),
        }
    }

    /// Route this client's diagnostics to `dispatch` instead of the default
    /// subscriber.
    pub fn with_diagnostics(mut self, dispatch: Dispatch) -> Self {
        self.diagnostics = dispatch;
        self
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn exchange_log(&self) -> &Arc<dyn ExchangeLog> {
        &self.exchange_log
    }

    fn emit(&self, event: impl FnOnce()) {
        tracing::dispatcher::with_default(&self.diagnostics, || {
            let span = info_span!("client", module = %self.module);
            let _entered = span.enter();
            event();
        });
    }

    /// Send `messages` to the model and return the response text.
    ///
    /// With a `conversation_id` the stored history is sent ahead of
    /// `messages`, and on success the last input message plus the response
    /// are appended to it. Every successful call records exactly one
    /// [`LogEntry`]. A failed remote call leaves the history untouched.
    pub async fn request_completion(
        &self,
        messages: &[Message],
        conversation_id: Option<&str>,
        temperature: f32,
    ) -> Result<String, DomainError> {
        let Some(prompt) = messages.last().cloned() else {
            return Err(DomainError::invalid_input(
                "at least one message is required for a completion",
            ));
        };
        // An empty id means no conversation.
        let conversation_id = conversation_id.filter(|id| !id.is_empty());

        let outbound = match conversation_id {
            Some(id) => self.conversations.lock().await.outbound(id, messages),
            None => messages.to_vec(),
        };

        let response = match self.chat_client.complete(&outbound, temperature).await {
            Ok(response) => response,
            Err(e) => {
                self.emit(|| error!("Error getting completion: {e}"));
                return Err(e);
            }
        };

        if let Some(id) = conversation_id {
            let len = self.conversations.lock().await.append_turn(
                id,
                prompt.clone(),
                Message::assistant(response.clone()),
            );
            self.emit(|| info!("Updated conversation {id} history. Current length: {len}"));
        }

        let key = conversation_id.unwrap_or(SINGLE_INTERACTION_KEY);
        let entry = LogEntry::new(self.module.clone(), messages.to_vec(), response.clone());
        if let Err(e) = self.exchange_log.record(key, entry).await {
            self.emit(|| error!("Failed to record exchange for {key}: {e}"));
            return Err(e);
        }

        self.emit(|| {
            info!(
                "Generated response for prompt: {}...",
                prompt.preview(PROMPT_PREVIEW_CHARS)
            )
        });
        Ok(response)
    }

    pub async fn start_conversation(&self) -> String {
        let id = self.conversations.lock().await.start();
        self.emit(|| info!("Started new conversation: {id}"));
        id
    }

    /// Record the final history with a `CONVERSATION_ENDED` entry and forget
    /// the conversation. Unknown ids are ignored and return `Ok(false)`.
    ///
    /// The conversation is only removed once its final entry is on disk.
    pub async fn end_conversation(&self, conversation_id: &str) -> Result<bool, DomainError> {
        let mut conversations = self.conversations.lock().await;
        if !conversations.contains(conversation_id) {
            return Ok(false);
        }

        let history = conversations.history(conversation_id);
        let entry = LogEntry::new(self.module.clone(), history, CONVERSATION_ENDED);
        self.exchange_log.record(conversation_id, entry).await?;

        conversations.remove(conversation_id);
        drop(conversations);
        self.emit(|| info!("Ended conversation: {conversation_id}"));
        Ok(true)
    }

    pub async fn get_conversation_history(&self, conversation_id: &str) -> Vec<Message> {
        self.conversations.lock().await.history(conversation_id)
    }

    /// Empty one conversation's history, or drop every conversation when no
    /// id is given.
    pub async fn clear_conversation_history(&self, conversation_id: Option<&str>) {
        let mut conversations = self.conversations.lock().await;
        match conversation_id {
            Some(id) => {
                if conversations.clear(id) {
                    self.emit(|| info!("Cleared history for conversation: {id}"));
                }
            }
            None => {
                conversations.clear_all();
                self.emit(|| info!("Cleared all conversation histories"));
            }
        }
    }

    pub async fn active_conversations(&self) -> Vec<String> {
        self.conversations.lock().await.ids()
    }
}
