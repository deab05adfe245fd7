//! Tracking task for a single playback
//!
//! Owns the event subscription and walks `AwaitingStart -> Playing ->
//! Terminated`. Each phase races cancellation, the next delivery and its own
//! deadline, and re-checks the deadline after every delivery it ignores. The
//! signals and subscription are released by `Drop`, so each is released
//! exactly once on every path.

use super::signal::SignalTrigger;
use super::PlaybackTimeouts;
use crate::error::TimeoutError;
use std::sync::{Arc, OnceLock};
use telplay_common::events::{ChannelEvent, Delivery, Subscription};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// How tracking terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Exit {
    /// Owner cancelled (either phase)
    Cancelled,
    /// Finish notification arrived with no start notification before it
    FinishedBeforeStart,
    /// Start then finish notification
    Finished,
    /// Start window elapsed
    StartTimeout,
    /// Stop window elapsed after start
    StopTimeout,
}

enum StartPhase {
    Started,
    Exited(Exit),
}

/// What a delivery means for the tracked playback
enum Step {
    Ignore,
    Started,
    Finished,
}

pub(crate) struct Tracker {
    // Field order is drop order: the subscription is released first, then the
    // start signal fires (if still pending), then the stop signal.
    subscription: Box<dyn Subscription>,
    started: Option<SignalTrigger>,
    _stopped: SignalTrigger,
    playback_id: String,
    timeouts: PlaybackTimeouts,
    cancel: CancellationToken,
    error: Arc<OnceLock<TimeoutError>>,
    stream_closed: bool,
}

impl Tracker {
    pub(crate) fn new(
        playback_id: String,
        subscription: Box<dyn Subscription>,
        timeouts: PlaybackTimeouts,
        cancel: CancellationToken,
        started: SignalTrigger,
        stopped: SignalTrigger,
        error: Arc<OnceLock<TimeoutError>>,
    ) -> Self {
        Self {
            subscription,
            started: Some(started),
            _stopped: stopped,
            playback_id,
            timeouts,
            cancel,
            error,
            stream_closed: false,
        }
    }

    /// Drive the playback to termination
    ///
    /// The terminal error (if any) is recorded before `self` is dropped, so it
    /// is visible to anyone who has observed the stop signal.
    pub(crate) async fn run(mut self) -> Exit {
        let exit = match self.await_start().await {
            StartPhase::Started => {
                info!("Playback started");
                if let Some(started) = self.started.take() {
                    started.fire();
                }
                self.await_stop().await
            }
            StartPhase::Exited(exit) => exit,
        };

        let error = match exit {
            Exit::StartTimeout => Some(TimeoutError::Start(self.timeouts.start)),
            Exit::StopTimeout => Some(TimeoutError::Stop(self.timeouts.stop)),
            Exit::Cancelled | Exit::FinishedBeforeStart | Exit::Finished => None,
        };
        if let Some(error) = error {
            let _ = self.error.set(error);
        }

        debug!(?exit, "Playback tracking terminated");
        drop(self);
        exit
    }

    async fn await_start(&mut self) -> StartPhase {
        let deadline = tokio::time::sleep(self.timeouts.start);
        tokio::pin!(deadline);

        loop {
            let step = tokio::select! {
                biased;

                _ = self.cancel.cancelled() => {
                    debug!("Tracking cancelled while awaiting start");
                    return StartPhase::Exited(Exit::Cancelled);
                }
                delivery = self.subscription.recv(), if !self.stream_closed => {
                    self.classify(delivery)
                }
                _ = &mut deadline => break,
            };

            match step {
                Step::Started => return StartPhase::Started,
                Step::Finished => {
                    info!("Playback finished (before start notification received)");
                    return StartPhase::Exited(Exit::FinishedBeforeStart);
                }
                Step::Ignore => {}
            }

            // A stream that always has something ready never lets the deadline
            // branch be polled.
            if Instant::now() >= deadline.deadline() {
                break;
            }
        }

        warn!(timeout = ?self.timeouts.start, "Playback timed out waiting for start");
        StartPhase::Exited(Exit::StartTimeout)
    }

    async fn await_stop(&mut self) -> Exit {
        let deadline = tokio::time::sleep(self.timeouts.stop);
        tokio::pin!(deadline);

        loop {
            let step = tokio::select! {
                biased;

                _ = self.cancel.cancelled() => {
                    debug!("Tracking cancelled while playing");
                    return Exit::Cancelled;
                }
                delivery = self.subscription.recv(), if !self.stream_closed => {
                    self.classify(delivery)
                }
                _ = &mut deadline => break,
            };

            match step {
                Step::Finished => {
                    info!("Playback finished");
                    return Exit::Finished;
                }
                Step::Started => debug!("Ignoring repeated start notification"),
                Step::Ignore => {}
            }

            if Instant::now() >= deadline.deadline() {
                break;
            }
        }

        warn!(timeout = ?self.timeouts.stop, "Playback timed out waiting for stop");
        Exit::StopTimeout
    }

    fn classify(&mut self, delivery: Option<Delivery>) -> Step {
        let event = match delivery {
            Some(Delivery::Event(event)) => event,
            Some(Delivery::Empty) => {
                debug!("Empty event received");
                return Step::Ignore;
            }
            None => {
                // Nothing more will arrive; only cancellation or the deadline
                // can end the current phase now.
                warn!("Event stream closed while tracking playback");
                self.stream_closed = true;
                return Step::Ignore;
            }
        };

        let (step, playback) = match &event {
            ChannelEvent::PlaybackStarted { playback, .. } => (Step::Started, playback),
            ChannelEvent::PlaybackFinished { playback, .. } => (Step::Finished, playback),
            other => {
                debug!(event_type = other.event_type(), "Unhandled event type");
                return Step::Ignore;
            }
        };

        if playback.id != self.playback_id {
            debug!(
                expected = %self.playback_id,
                got = %playback.id,
                "Ignoring unrelated playback"
            );
            return Step::Ignore;
        }
        step
    }
}

impl Drop for Tracker {
    fn drop(&mut self) {
        self.subscription.cancel();
    }
}
