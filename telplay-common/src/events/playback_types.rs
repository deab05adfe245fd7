//! Playback-related supporting types

use serde::{Deserialize, Serialize};

/// Identifying data of a single remote playback instance
///
/// `id` is the correlation key: lifecycle events for this instance carry the
/// same value in their `playback.id` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackData {
    /// Unique instance identifier assigned by the remote control plane
    pub id: String,
    /// Media reference being played (e.g. `sound:tt-monkeys`)
    pub media_uri: String,
    /// Resource the media is rendered to (e.g. `channel:1234`)
    #[serde(default)]
    pub target_uri: Option<String>,
    /// Remote-reported state ("queued", "playing", "done", ...)
    #[serde(default)]
    pub state: Option<String>,
}

impl PlaybackData {
    /// Identifying data with only an id and media reference
    pub fn new(id: impl Into<String>, media_uri: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            media_uri: media_uri.into(),
            target_uri: None,
            state: None,
        }
    }
}
