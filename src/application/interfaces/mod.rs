mod chat_client;
mod exchange_log;

pub use chat_client::*;
pub use exchange_log::*;
