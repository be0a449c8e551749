pub mod application;
pub mod cli;
pub mod config;
pub mod connector;
pub mod domain;

pub use application::{
    ChatClient, ConversationClient, ExchangeLog, DEFAULT_TEMPERATURE,
};

pub use cli::Commands;
pub use config::ClientConfig;

pub use connector::{
    Container, ContainerConfig, DiagnosticLog, FileExchangeLog, MemoryExchangeLog,
    MockChatClient, OpenRouterClient, RecordedRequest, Router,
};

pub use domain::{
    DomainError, LogEntry, MasterLog, Message, Role, CONVERSATION_ENDED, SINGLE_INTERACTION_KEY,
};
