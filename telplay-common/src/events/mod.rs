//! Event types for the telplay event system
//!
//! Provides the closed channel event definitions, the subscription capability
//! consumed by the playback tracker, and an in-process EventBus.

// Sub-modules (supporting types)
mod bus;
mod playback_types;

pub use bus::{BusSubscription, EventBus};
pub use playback_types::PlaybackData;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Wire tag of the start notification
pub const PLAYBACK_STARTED: &str = "PlaybackStarted";

/// Wire tag of the finish notification
pub const PLAYBACK_FINISHED: &str = "PlaybackFinished";

/// Events reported by the remote telephony control plane
///
/// Decoded once at the bus boundary; consumers match on variants and never
/// inspect raw payloads. Tags not listed here decode to `Unrecognized`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ChannelEvent {
    /// Playback of a media resource has begun
    PlaybackStarted {
        /// Instance the notification refers to
        playback: PlaybackData,
        /// When the remote reported the start
        #[serde(default = "Utc::now")]
        timestamp: DateTime<Utc>,
    },

    /// Playback of a media resource has ended (completed or stopped)
    PlaybackFinished {
        /// Instance the notification refers to
        playback: PlaybackData,
        /// When the remote reported the finish
        #[serde(default = "Utc::now")]
        timestamp: DateTime<Utc>,
    },

    /// DTMF digit received on a channel
    ChannelDtmfReceived {
        channel_id: String,
        digit: String,
        #[serde(default = "Utc::now")]
        timestamp: DateTime<Utc>,
    },

    /// Hangup requested on a channel
    ChannelHangupRequest {
        channel_id: String,
        #[serde(default = "Utc::now")]
        timestamp: DateTime<Utc>,
    },

    /// Any event type this crate does not model
    #[serde(other)]
    Unrecognized,
}

impl ChannelEvent {
    /// Start notification for the given instance, stamped now
    pub fn playback_started(playback: PlaybackData) -> Self {
        ChannelEvent::PlaybackStarted {
            playback,
            timestamp: Utc::now(),
        }
    }

    /// Finish notification for the given instance, stamped now
    pub fn playback_finished(playback: PlaybackData) -> Self {
        ChannelEvent::PlaybackFinished {
            playback,
            timestamp: Utc::now(),
        }
    }

    /// Get event type as string for filtering
    pub fn event_type(&self) -> &str {
        match self {
            ChannelEvent::PlaybackStarted { .. } => PLAYBACK_STARTED,
            ChannelEvent::PlaybackFinished { .. } => PLAYBACK_FINISHED,
            ChannelEvent::ChannelDtmfReceived { .. } => "ChannelDtmfReceived",
            ChannelEvent::ChannelHangupRequest { .. } => "ChannelHangupRequest",
            ChannelEvent::Unrecognized => "Unrecognized",
        }
    }

    /// Playback instance id for the two lifecycle events, None otherwise
    pub fn playback_id(&self) -> Option<&str> {
        match self {
            ChannelEvent::PlaybackStarted { playback, .. }
            | ChannelEvent::PlaybackFinished { playback, .. } => Some(playback.id.as_str()),
            _ => None,
        }
    }

    /// Decode a raw JSON frame
    pub fn from_json(frame: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(frame)?)
    }
}

/// One item pulled from a subscription
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    /// A decoded event matching the subscription's type filter
    Event(ChannelEvent),
    /// A delivery carrying nothing usable (e.g. a gap after the receiver lagged)
    Empty,
}

/// Receive side of an event subscription
///
/// Exactly one reader owns a subscription. `recv` yields deliveries in
/// arrival order and returns `None` once the stream is closed or the
/// subscription has been cancelled.
#[async_trait]
pub trait Subscription: Send {
    /// Wait for the next delivery
    async fn recv(&mut self) -> Option<Delivery>;

    /// Release the subscription. Safe to call more than once.
    fn cancel(&mut self);
}

/// Event delivery capability: subscribe to a set of event type tags
pub trait Subscriber: Send + Sync {
    /// Open a subscription receiving only events whose `event_type()` is listed
    fn subscribe(&self, event_types: &[&str]) -> Box<dyn Subscription>;
}
