use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

use crate::application::ChatClient;
use crate::domain::{DomainError, Message};

const MOCK_MODEL: &str = "mock-chat";

/// One payload as received by [`MockChatClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub messages: Vec<Message>,
    pub temperature: f32,
}

enum Script {
    /// Pops one scripted outcome per call.
    Queue(VecDeque<Result<String, String>>),
    /// Replies with the last message's content.
    Echo,
}

/// Offline [`ChatClient`] that replays scripted outcomes and records every
/// outbound payload.
pub struct MockChatClient {
    script: Mutex<Script>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockChatClient {
    pub fn with_responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::scripted(responses.into_iter().map(|r| Ok(r.into())))
    }

    /// Mix of successes (`Ok`) and remote failures (`Err` with the message).
    pub fn scripted(outcomes: impl IntoIterator<Item = Result<String, String>>) -> Self {
        Self {
            script: Mutex::new(Script::Queue(outcomes.into_iter().collect())),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self::scripted([Err(message.into())])
    }

    pub fn echo() -> Self {
        Self {
            script: Mutex::new(Script::Echo),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ChatClient for MockChatClient {
    async fn complete(&self, messages: &[Message], temperature: f32) -> Result<String, DomainError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(RecordedRequest {
                messages: messages.to_vec(),
                temperature,
            });
        }

        let mut script = self
            .script
            .lock()
            .map_err(|_| DomainError::remote_call("mock script lock poisoned"))?;

        let outcome = match &mut *script {
            Script::Echo => Ok(messages
                .last()
                .map(|m| format!("echo: {}", m.content))
                .unwrap_or_default()),
            Script::Queue(queue) => queue
                .pop_front()
                .unwrap_or_else(|| Err("no scripted response left".to_string())),
        };

        debug!("MockChatClient: {} messages -> {:?}", messages.len(), outcome);
        outcome.map_err(DomainError::remote_call)
    }

    fn model(&self) -> &str {
        MOCK_MODEL
    }
}
