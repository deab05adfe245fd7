//! Common error types for telplay

use thiserror::Error;

/// Common result type for telplay operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the event and command boundaries
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Raw event frame could not be decoded into a ChannelEvent
    #[error("Event decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The remote control plane rejected or failed a command
    #[error("Remote command failed: {0}")]
    Remote(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),
}
