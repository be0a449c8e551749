use anyhow::Result;

use crate::domain::Message;

use super::super::Container;

pub struct AskController<'a> {
    container: &'a Container,
}

impl<'a> AskController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    /// One completion outside any conversation, logged as a single interaction.
    pub async fn ask(&self, prompt: String, system: Option<String>, temperature: f32) -> Result<String> {
        let messages = build_messages(prompt, system);
        let client = self.container.client()?;
        let reply = client.request_completion(&messages, None, temperature).await?;
        Ok(reply)
    }
}

/// Optional system message followed by the user's prompt.
pub(crate) fn build_messages(prompt: String, system: Option<String>) -> Vec<Message> {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = system {
        messages.push(Message::system(system));
    }
    messages.push(Message::user(prompt));
    messages
}
