//! In-process EventBus
//!
//! Stands in for the remote control plane's event stream: the loopback player
//! publishes here, and the playback tracker subscribes here.

use super::{ChannelEvent, Delivery, Subscriber, Subscription};
use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

/// Central event distribution bus for channel events
///
/// The EventBus uses tokio::broadcast internally, providing:
/// - Non-blocking publish (slow subscribers don't block producers)
/// - Multiple concurrent subscribers
/// - Automatic cleanup when subscribers drop
/// - Lagged message detection for slow subscribers (surfaced as `Delivery::Empty`)
///
/// # Examples
///
/// ```
/// use telplay_common::events::{ChannelEvent, EventBus, PlaybackData, Subscriber};
///
/// let bus = EventBus::new(100);
/// let _sub = bus.subscribe(&["PlaybackStarted", "PlaybackFinished"]);
///
/// bus.emit(ChannelEvent::playback_started(PlaybackData::new("pb-1", "sound:hello")))
///     .ok();
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ChannelEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// # Arguments
    ///
    /// * `capacity` - Number of events to buffer per subscriber before the
    ///   oldest are dropped
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0, as `tokio::sync::broadcast::channel` does.
    /// `TomlConfig` rejects a zero `event_bus_capacity` before it gets here.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: ChannelEvent,
    ) -> Result<usize, broadcast::error::SendError<ChannelEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: ChannelEvent) {
        let _ = self.tx.send(event);
    }

    /// Decode a raw JSON frame and emit it
    ///
    /// Returns the number of subscribers reached (0 if none). Frames that do
    /// not decode are rejected here and never reach subscribers.
    pub fn emit_json(&self, frame: &str) -> crate::Result<usize> {
        let event = ChannelEvent::from_json(frame)?;
        Ok(self.tx.send(event).unwrap_or(0))
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Subscriber for EventBus {
    fn subscribe(&self, event_types: &[&str]) -> Box<dyn Subscription> {
        Box::new(BusSubscription {
            rx: Some(self.tx.subscribe()),
            event_types: event_types.iter().map(|t| t.to_string()).collect(),
        })
    }
}

/// Subscription handed out by [`EventBus`]
///
/// Filters by event type tag; an empty filter receives everything.
pub struct BusSubscription {
    rx: Option<broadcast::Receiver<ChannelEvent>>,
    event_types: Vec<String>,
}

impl BusSubscription {
    /// Whether `cancel` has been called
    pub fn is_cancelled(&self) -> bool {
        self.rx.is_none()
    }

    fn wants(&self, event: &ChannelEvent) -> bool {
        self.event_types.is_empty() || self.event_types.iter().any(|t| t == event.event_type())
    }
}

#[async_trait]
impl Subscription for BusSubscription {
    async fn recv(&mut self) -> Option<Delivery> {
        loop {
            let result = self.rx.as_mut()?.recv().await;
            match result {
                Ok(event) if self.wants(&event) => return Some(Delivery::Event(event)),
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "Subscription lagged behind the event bus");
                    return Some(Delivery::Empty);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    fn cancel(&mut self) {
        // Dropping the receiver unsubscribes from the broadcast channel
        self.rx = None;
    }
}

impl Drop for BusSubscription {
    fn drop(&mut self) {
        self.cancel();
    }
}
