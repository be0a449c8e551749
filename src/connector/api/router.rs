use anyhow::Result;

use crate::Commands;

use super::container::Container;
use super::controller::{AskController, ChatController, LogController};

pub struct Router<'a> {
    ask_controller: AskController<'a>,
    chat_controller: ChatController<'a>,
    log_controller: LogController<'a>,
}

impl<'a> Router<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self {
            ask_controller: AskController::new(container),
            chat_controller: ChatController::new(container),
            log_controller: LogController::new(container),
        }
    }

    pub async fn route(&self, command: Commands) -> Result<String> {
        match command {
            Commands::Ask {
                prompt,
                system,
                temperature,
            } => self.ask_controller.ask(prompt, system, temperature).await,
            Commands::Chat {
                system,
                temperature,
            } => self.chat_controller.chat(system, temperature).await,
            Commands::Log { conversation } => self.log_controller.log(conversation).await,
        }
    }
}
