//! Test helper modules for telplay integration tests
//!
//! Provides reusable test infrastructure components:
//! - ScriptedBus: Subscriber whose deliveries the test pushes one by one
//! - ScriptedPlayer: Player with a fixed playback id and optional failures
//! - FloodingBus: Subscriber whose stream is never idle

#![allow(dead_code)]

pub mod flooding_bus;
pub mod scripted_bus;
pub mod scripted_player;

// Re-export commonly used types
pub use flooding_bus::FloodingBus;
pub use scripted_bus::{EventFeed, ScriptedBus, SubscriptionStats};
pub use scripted_player::ScriptedPlayer;

use std::time::Duration;
use telplay::PlaybackTimeouts;

/// Windows used throughout the tests
pub fn test_timeouts() -> PlaybackTimeouts {
    PlaybackTimeouts {
        start: Duration::from_secs(1),
        stop: Duration::from_secs(600),
    }
}
