mod diagnostic_log;
mod file_exchange_log;
mod memory_exchange_log;
mod mock_chat_client;
mod openrouter_client;

pub use diagnostic_log::*;
pub use file_exchange_log::*;
pub use memory_exchange_log::*;
pub use mock_chat_client::*;
pub use openrouter_client::*;
