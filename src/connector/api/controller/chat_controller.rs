use std::io::Write;

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use super::super::Container;
use super::ask_controller::build_messages;

pub struct ChatController<'a> {
    container: &'a Container,
}

impl<'a> ChatController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    /// Interactive conversation on stdin/stdout.
    pub async fn chat(&self, system: Option<String>, temperature: f32) -> Result<String> {
        let stdin = BufReader::new(tokio::io::stdin());
        let mut stdout = std::io::stdout();
        self.run(stdin, &mut stdout, system, temperature).await
    }

    /// Drive one conversation from `input` until `/quit` or end of input.
    ///
    /// A failed turn is reported and the session continues; the conversation
    /// is always ended (and its final state logged) on the way out.
    pub async fn run<R, W>(
        &self,
        input: R,
        output: &mut W,
        system: Option<String>,
        temperature: f32,
    ) -> Result<String>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let client = self.container.client()?;
        let id = client.start_conversation().await;
        writeln!(output, "Conversation {id} started. Commands: /history, /clear, /quit")?;

        let mut lines = input.lines();
        let mut turns = 0usize;

        while let Some(line) = lines.next_line().await? {
            match line.trim() {
                "" => continue,
                "/quit" | "/exit" => break,
                "/history" => {
                    let history = client.get_conversation_history(&id).await;
                    if history.is_empty() {
                        writeln!(output, "(empty)")?;
                    }
                    for message in history {
                        writeln!(output, "[{}] {}", message.role, message.content)?;
                    }
                }
                "/clear" => {
                    client.clear_conversation_history(Some(&id)).await;
                    writeln!(output, "History cleared.")?;
                }
                prompt => {
                    let messages = build_messages(prompt.to_string(), system.clone());
                    match client.request_completion(&messages, Some(&id), temperature).await {
                        Ok(reply) => {
                            turns += 1;
                            writeln!(output, "{reply}")?;
                        }
                        Err(e) => writeln!(output, "Error: {e}")?,
                    }
                }
            }
            output.flush()?;
        }

        client.end_conversation(&id).await?;
        Ok(format!("Conversation {id} ended after {turns} turns."))
    }
}
