//! # Connector Layer
//!
//! External integrations implementing application interfaces:
//! - Chat completions (OpenRouter over HTTP, scripted mock)
//! - Exchange logs (JSON files on disk, in-memory)
//! - Per-client diagnostic log files
//! - The CLI's container, router and controllers

pub mod adapter;
pub mod api;

pub use adapter::*;
pub use api::*;
