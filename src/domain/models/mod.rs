mod conversation;
mod log_entry;
mod message;

pub use conversation::*;
pub use log_entry::*;
pub use message::*;
