use async_trait::async_trait;

use crate::domain::{DomainError, Message};

/// Sends an ordered list of chat messages to an LLM and returns the text of
/// the first completion choice.
///
/// Implementors encapsulate transport, serialization, and vendor-specific API
/// details. Any failure is reported as [`DomainError::RemoteCall`].
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(&self, messages: &[Message], temperature: f32) -> Result<String, DomainError>;

    /// Model identifier sent with every request.
    fn model(&self) -> &str;
}
