//! Command capability consumed by the playback tracker
//!
//! A `Player` is anything media can be played to (typically a channel on the
//! remote control plane). Playing returns a `RemotePlayback` that identifies
//! the started instance.

use async_trait::async_trait;
use telplay_common::events::PlaybackData;

/// Handle to a playback instance on the remote control plane
#[async_trait]
pub trait RemotePlayback: Send + Sync {
    /// Fetch the instance's identifying data
    async fn data(&self) -> telplay_common::Result<PlaybackData>;
}

/// Something that media can be played to
#[async_trait]
pub trait Player: Send + Sync {
    /// Issue the play command for `media_uri`
    ///
    /// Fire-and-forget from the remote's point of view: success means the
    /// command was accepted, not that playback has begun.
    async fn play(&self, media_uri: &str) -> telplay_common::Result<Box<dyn RemotePlayback>>;
}
