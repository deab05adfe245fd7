//! In-process emulation of the remote control plane
//!
//! `LoopbackPlayer` accepts play commands, assigns each a fresh identifier and
//! publishes the playback's lifecycle notifications on an [`EventBus`] on a
//! configurable schedule. Used by the CLI and by the integration tests.

use crate::player::{Player, RemotePlayback};
use async_trait::async_trait;
use std::time::Duration;
use telplay_common::events::{ChannelEvent, EventBus, PlaybackData};
use telplay_common::{Error, Result};
use tracing::debug;
use uuid::Uuid;

/// How the emulated remote behaves for each play command
#[derive(Debug, Clone)]
pub struct LoopbackBehavior {
    /// Delay between accepting the command and the start notification
    pub start_delay: Duration,
    /// Delay between the start and finish notifications
    pub duration: Duration,
    /// Publish the start notification
    pub emit_start: bool,
    /// Publish the finish notification
    pub emit_finish: bool,
    /// Reject the play command
    pub fail_play: bool,
    /// Accept the command, but fail the data lookup
    pub fail_data: bool,
}

impl Default for LoopbackBehavior {
    fn default() -> Self {
        Self {
            start_delay: Duration::from_millis(50),
            duration: Duration::from_millis(500),
            emit_start: true,
            emit_finish: true,
            fail_play: false,
            fail_data: false,
        }
    }
}

/// Player that emulates the remote on a local event bus
pub struct LoopbackPlayer {
    bus: EventBus,
    behavior: LoopbackBehavior,
    target_uri: Option<String>,
}

impl LoopbackPlayer {
    pub fn new(bus: EventBus, behavior: LoopbackBehavior) -> Self {
        Self {
            bus,
            behavior,
            target_uri: None,
        }
    }

    /// Report `target_uri` (e.g. `channel:1234`) in playback data
    pub fn with_target(mut self, target_uri: impl Into<String>) -> Self {
        self.target_uri = Some(target_uri.into());
        self
    }

    pub fn behavior(&self) -> &LoopbackBehavior {
        &self.behavior
    }
}

#[async_trait]
impl Player for LoopbackPlayer {
    async fn play(&self, media_uri: &str) -> Result<Box<dyn RemotePlayback>> {
        if self.behavior.fail_play {
            return Err(Error::Remote(format!("play rejected for {}", media_uri)));
        }

        let data = PlaybackData {
            id: Uuid::new_v4().to_string(),
            media_uri: media_uri.to_string(),
            target_uri: self.target_uri.clone(),
            state: Some("queued".to_string()),
        };

        tokio::spawn(emit_lifecycle(
            self.bus.clone(),
            self.behavior.clone(),
            data.clone(),
        ));

        Ok(Box::new(LoopbackHandle {
            data,
            fail_data: self.behavior.fail_data,
        }))
    }
}

async fn emit_lifecycle(bus: EventBus, behavior: LoopbackBehavior, data: PlaybackData) {
    tokio::time::sleep(behavior.start_delay).await;
    if behavior.emit_start {
        debug!(playback_id = %data.id, "Loopback: playback started");
        bus.emit_lossy(ChannelEvent::playback_started(PlaybackData {
            state: Some("playing".to_string()),
            ..data.clone()
        }));
    }

    tokio::time::sleep(behavior.duration).await;
    if behavior.emit_finish {
        debug!(playback_id = %data.id, "Loopback: playback finished");
        bus.emit_lossy(ChannelEvent::playback_finished(PlaybackData {
            state: Some("done".to_string()),
            ..data
        }));
    }
}

/// Remote handle returned by [`LoopbackPlayer`]
#[derive(Debug)]
pub struct LoopbackHandle {
    data: PlaybackData,
    fail_data: bool,
}

#[async_trait]
impl RemotePlayback for LoopbackHandle {
    async fn data(&self) -> Result<PlaybackData> {
        if self.fail_data {
            return Err(Error::NotFound(format!("playback {}", self.data.id)));
        }
        Ok(self.data.clone())
    }
}
