pub mod ask_controller;
pub mod chat_controller;
pub mod log_controller;

pub use ask_controller::AskController;
pub use chat_controller::ChatController;
pub use log_controller::LogController;
