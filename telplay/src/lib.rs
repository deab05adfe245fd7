//! # Telplay Playback Tracker (telplay)
//!
//! Turns a fire-and-forget "play" command against a remote telephony control
//! plane into a cancellable, timeout-bounded handle that reports when the
//! playback started, when it stopped, and why.
//!
//! **Architecture:** one tokio task per playback consumes lifecycle events
//! from an event subscription and drives one-shot start/stop signals on the
//! [`Playback`] handle returned to the caller.

pub mod error;
pub mod loopback;
pub mod playback;
pub mod player;

pub use error::{Error, Result, TimeoutError};
pub use playback::{
    play_async, play_async_with, play_sync, play_sync_with, Playback, PlaybackTimeouts, Signal,
};
pub use player::{Player, RemotePlayback};
