//! # Application Layer
//!
//! Ports to the outside world and the conversation service built on them.

mod conversation_client;
pub mod interfaces;

pub use conversation_client::*;
pub use interfaces::*;
