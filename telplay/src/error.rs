//! Error types for telplay
//!
//! Setup failures are returned directly from `play_async`; timeouts are the
//! only errors a tracking task ever records on a playback handle.

use std::time::Duration;
use thiserror::Error;

/// A playback lifecycle window elapsed without the expected notification
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeoutError {
    /// No start (or finish) notification within the start window
    #[error("Timeout waiting for start of playback after {0:?}")]
    Start(Duration),

    /// Started, but no finish notification within the stop window
    #[error("Timeout waiting for stop of playback after {0:?}")]
    Stop(Duration),
}

/// Main error type for telplay
#[derive(Error, Debug)]
pub enum Error {
    /// Issuing the play command failed
    #[error("Failed to issue play command: {0}")]
    Play(#[source] telplay_common::Error),

    /// Retrieving the remote playback's identifying data failed
    #[error("Failed to retrieve playback data: {0}")]
    PlaybackData(#[source] telplay_common::Error),

    /// A lifecycle window elapsed
    #[error(transparent)]
    Timeout(#[from] TimeoutError),

    /// The caller's cancellation token fired before playback stopped
    #[error("Playback wait cancelled by caller")]
    Cancelled,
}

impl Error {
    /// Whether this error is a start or stop timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout(_))
    }
}

/// Convenience Result type using telplay Error
pub type Result<T> = std::result::Result<T, Error>;
