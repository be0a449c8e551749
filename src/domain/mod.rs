//! # Domain Layer
//!
//! Messages, conversation histories and log records.
//! This layer is independent of the HTTP client and the filesystem.

mod error;
pub mod models;

pub use error::*;
pub use models::*;
