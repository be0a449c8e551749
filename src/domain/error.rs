use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    /// The completion endpoint could not be reached, rejected the request,
    /// or answered with something that is not a usable completion.
    #[error("Remote call failed: {0}")]
    RemoteCall(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Master log is corrupt: {0}")]
    LogCorrupt(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DomainError {
    pub fn remote_call(msg: impl Into<String>) -> Self {
        Self::RemoteCall(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn log_corrupt(msg: impl Into<String>) -> Self {
        Self::LogCorrupt(msg.into())
    }

    pub fn is_remote_call(&self) -> bool {
        matches!(self, Self::RemoteCall(_))
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}
