//! Playback tracking
//!
//! Plays a media reference through a [`Player`] and tracks the resulting
//! remote playback through its lifecycle events.
//!
//! **Entry points:**
//! - [`play_async`] issues the play command and returns a [`Playback`] handle
//!   as soon as the command is accepted; a background task tracks the rest.
//! - [`play_sync`] does the same, then waits for the playback to stop or for
//!   the caller's cancellation token, whichever comes first.
//!
//! **Signals:** a handle's start signal is always set no later than its stop
//! signal. The terminal error is only readable once the stop signal is set.

mod signal;
mod tracker;

pub use signal::Signal;

use crate::error::{Error, Result, TimeoutError};
use crate::player::{Player, RemotePlayback};
use signal::signal;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use telplay_common::config::PlaybackSettings;
use telplay_common::events::{PlaybackData, Subscriber, PLAYBACK_FINISHED, PLAYBACK_STARTED};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info_span, Instrument};
use tracker::Tracker;

/// Default time to wait for the start notification
pub const DEFAULT_START_TIMEOUT: Duration = Duration::from_secs(1);

/// Default maximum time a started playback may take to finish
pub const DEFAULT_MAX_PLAYBACK_TIME: Duration = Duration::from_secs(10 * 60);

/// The two independent tracking windows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackTimeouts {
    /// Armed from the moment tracking starts until the start notification
    pub start: Duration,
    /// Armed from the start notification until the finish notification
    pub stop: Duration,
}

impl Default for PlaybackTimeouts {
    fn default() -> Self {
        Self {
            start: DEFAULT_START_TIMEOUT,
            stop: DEFAULT_MAX_PLAYBACK_TIME,
        }
    }
}

impl From<&PlaybackSettings> for PlaybackTimeouts {
    fn from(settings: &PlaybackSettings) -> Self {
        Self {
            start: settings.start_timeout(),
            stop: settings.max_playback(),
        }
    }
}

/// Handle to a tracked playback
///
/// Returned by [`play_async`]. Dropping the handle cancels tracking: any
/// [`Signal`] cloned from it is then set, with no terminal error recorded.
pub struct Playback {
    remote: Box<dyn RemotePlayback>,
    data: PlaybackData,
    started: Signal,
    stopped: Signal,
    cancel: CancellationToken,
    error: Arc<OnceLock<TimeoutError>>,
}

impl Playback {
    /// Identifier the tracker correlates events against
    pub fn id(&self) -> &str {
        &self.data.id
    }

    /// Identifying data fetched when the playback was accepted
    pub fn data(&self) -> &PlaybackData {
        &self.data
    }

    /// The remote playback this handle owns
    pub fn remote(&self) -> &dyn RemotePlayback {
        self.remote.as_ref()
    }

    /// Signal set when playback has begun or will never begin
    ///
    /// The signal outlives the handle. Dropping the `Playback` cancels
    /// tracking, which sets this signal.
    pub fn start_signal(&self) -> Signal {
        self.started.clone()
    }

    /// Signal set when tracking has terminated (finished, timed out or cancelled)
    ///
    /// Dropping the `Playback` cancels tracking, so a clone held past the
    /// handle fires with no error recorded. That is indistinguishable from a
    /// natural finish; keep the handle alive and use [`Playback::wait`] when
    /// the outcome matters.
    pub fn stop_signal(&self) -> Signal {
        self.stopped.clone()
    }

    /// Wait for the start signal
    pub async fn started(&self) {
        self.started.wait().await
    }

    /// Wait for the stop signal
    pub async fn stopped(&self) {
        self.stopped.wait().await
    }

    /// Whether the start signal is set
    pub fn is_started(&self) -> bool {
        self.started.is_set()
    }

    /// Whether tracking has terminated
    pub fn is_stopped(&self) -> bool {
        self.stopped.is_set()
    }

    /// Error that terminated tracking
    ///
    /// `None` while tracking is still running, and `None` after a natural
    /// finish or a cancellation.
    pub fn terminal_error(&self) -> Option<Error> {
        if !self.stopped.is_set() {
            return None;
        }
        self.error.get().cloned().map(Error::from)
    }

    /// Request termination of tracking
    ///
    /// Never blocks; calling it again, or after tracking has ended, does nothing.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the stop signal and return the terminal error, if any
    pub async fn wait(&self) -> Result<()> {
        self.stopped().await;
        self.terminal_error().map_or(Ok(()), Err)
    }
}

impl std::fmt::Debug for Playback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Playback")
            .field("data", &self.data)
            .field("started", &self.is_started())
            .field("stopped", &self.is_stopped())
            .finish()
    }
}

impl Drop for Playback {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Play `media_uri` with default timeouts and return once the command is accepted
pub async fn play_async(
    bus: &dyn Subscriber,
    player: &dyn Player,
    media_uri: &str,
) -> Result<Playback> {
    play_async_with(bus, player, media_uri, PlaybackTimeouts::default()).await
}

/// Play `media_uri` and return once the command is accepted
///
/// Subscribes before issuing the command so a start notification that races
/// the command's acceptance is not missed. If the command or the data lookup
/// fails, the subscription is released and no tracking task is started.
pub async fn play_async_with(
    bus: &dyn Subscriber,
    player: &dyn Player,
    media_uri: &str,
    timeouts: PlaybackTimeouts,
) -> Result<Playback> {
    let mut subscription = bus.subscribe(&[PLAYBACK_STARTED, PLAYBACK_FINISHED]);

    let remote = match player.play(media_uri).await {
        Ok(remote) => remote,
        Err(e) => {
            subscription.cancel();
            return Err(Error::Play(e));
        }
    };

    let data = match remote.data().await {
        Ok(data) => data,
        Err(e) => {
            subscription.cancel();
            return Err(Error::PlaybackData(e));
        }
    };

    let (start_trigger, started) = signal();
    let (stop_trigger, stopped) = signal();
    let cancel = CancellationToken::new();
    let error = Arc::new(OnceLock::new());

    let tracker = Tracker::new(
        data.id.clone(),
        subscription,
        timeouts,
        cancel.clone(),
        start_trigger,
        stop_trigger,
        Arc::clone(&error),
    );
    let span = info_span!("playback", playback_id = %data.id, media_uri = %media_uri);
    tokio::spawn(tracker.run().instrument(span));

    Ok(Playback {
        remote,
        data,
        started,
        stopped,
        cancel,
        error,
    })
}

/// Play `media_uri` with default timeouts and wait for it to stop
pub async fn play_sync(
    cancel: &CancellationToken,
    bus: &dyn Subscriber,
    player: &dyn Player,
    media_uri: &str,
) -> Result<()> {
    play_sync_with(cancel, bus, player, media_uri, PlaybackTimeouts::default()).await
}

/// Play `media_uri` and wait until it stops or `cancel` fires
///
/// Returns `Ok(())` on a natural finish, the timeout error if a window
/// elapsed, or [`Error::Cancelled`] if `cancel` fired first. In the last case
/// this returns without waiting for the tracking task to release its
/// subscription; it does so on its own.
pub async fn play_sync_with(
    cancel: &CancellationToken,
    bus: &dyn Subscriber,
    player: &dyn Player,
    media_uri: &str,
    timeouts: PlaybackTimeouts,
) -> Result<()> {
    let playback = play_async_with(bus, player, media_uri, timeouts).await?;

    let outcome = tokio::select! {
        biased;

        _ = cancel.cancelled() => {
            debug!(playback_id = %playback.id(), "Caller cancelled playback wait");
            Err(Error::Cancelled)
        }
        _ = playback.stopped() => playback.terminal_error().map_or(Ok(()), Err),
    };

    playback.cancel();
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timeouts() {
        let timeouts = PlaybackTimeouts::default();
        assert_eq!(timeouts.start, Duration::from_secs(1));
        assert_eq!(timeouts.stop, Duration::from_secs(600));
    }

    #[test]
    fn test_timeouts_from_settings() {
        let settings = PlaybackSettings {
            start_timeout_ms: 250,
            max_playback_ms: 5_000,
        };
        let timeouts = PlaybackTimeouts::from(&settings);
        assert_eq!(timeouts.start, Duration::from_millis(250));
        assert_eq!(timeouts.stop, Duration::from_secs(5));
    }
}
