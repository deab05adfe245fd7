//! Scripted player with a fixed playback id

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use telplay::{Player, RemotePlayback};
use telplay_common::events::PlaybackData;
use telplay_common::{Error, Result};

pub struct ScriptedPlayer {
    playback_id: String,
    fail_play: bool,
    fail_data: bool,
    plays: AtomicUsize,
}

impl ScriptedPlayer {
    pub fn new(playback_id: &str) -> Self {
        Self {
            playback_id: playback_id.to_string(),
            fail_play: false,
            fail_data: false,
            plays: AtomicUsize::new(0),
        }
    }

    pub fn failing_play() -> Self {
        Self {
            fail_play: true,
            ..Self::new("never")
        }
    }

    pub fn failing_data(playback_id: &str) -> Self {
        Self {
            fail_data: true,
            ..Self::new(playback_id)
        }
    }

    pub fn plays(&self) -> usize {
        self.plays.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Player for ScriptedPlayer {
    async fn play(&self, media_uri: &str) -> Result<Box<dyn RemotePlayback>> {
        self.plays.fetch_add(1, Ordering::SeqCst);
        if self.fail_play {
            return Err(Error::Remote("channel not found".to_string()));
        }
        Ok(Box::new(ScriptedRemote {
            data: PlaybackData::new(self.playback_id.clone(), media_uri),
            fail_data: self.fail_data,
        }))
    }
}

struct ScriptedRemote {
    data: PlaybackData,
    fail_data: bool,
}

#[async_trait]
impl RemotePlayback for ScriptedRemote {
    async fn data(&self) -> Result<PlaybackData> {
        if self.fail_data {
            return Err(Error::NotFound(format!("playback {}", self.data.id)));
        }
        Ok(self.data.clone())
    }
}
