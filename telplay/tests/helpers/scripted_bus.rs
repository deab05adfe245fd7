//! Scripted event subscription
//!
//! The test holds an `EventFeed` and pushes exactly the deliveries it wants
//! the tracker to see, including empty deliveries and a closed stream.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use telplay_common::events::{
    ChannelEvent, Delivery, PlaybackData, Subscriber, Subscription,
};
use tokio::sync::mpsc;

/// Counters shared between a ScriptedBus and the test
#[derive(Debug, Default)]
pub struct SubscriptionStats {
    subscribed: AtomicUsize,
    cancel_calls: AtomicUsize,
    released: AtomicBool,
    event_types: Mutex<Vec<String>>,
}

impl SubscriptionStats {
    pub fn subscribed(&self) -> usize {
        self.subscribed.load(Ordering::SeqCst)
    }

    pub fn cancel_calls(&self) -> usize {
        self.cancel_calls.load(Ordering::SeqCst)
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    pub fn event_types(&self) -> Vec<String> {
        self.event_types.lock().expect("stats lock").clone()
    }

    /// Wait (in virtual or real time) until the subscription is released
    pub async fn wait_released(&self) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !self.is_released() {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .expect("subscription was never released");
    }
}

/// Subscriber handing out one scripted subscription
pub struct ScriptedBus {
    feed_rx: Mutex<Option<mpsc::UnboundedReceiver<Delivery>>>,
    stats: Arc<SubscriptionStats>,
}

impl ScriptedBus {
    pub fn new() -> (Self, EventFeed) {
        let (tx, rx) = mpsc::unbounded_channel();
        let bus = Self {
            feed_rx: Mutex::new(Some(rx)),
            stats: Arc::new(SubscriptionStats::default()),
        };
        (bus, EventFeed { tx: Some(tx) })
    }

    pub fn stats(&self) -> Arc<SubscriptionStats> {
        Arc::clone(&self.stats)
    }
}

impl Subscriber for ScriptedBus {
    fn subscribe(&self, event_types: &[&str]) -> Box<dyn Subscription> {
        self.stats.subscribed.fetch_add(1, Ordering::SeqCst);
        *self.stats.event_types.lock().expect("stats lock") =
            event_types.iter().map(|t| t.to_string()).collect();

        let rx = self
            .feed_rx
            .lock()
            .expect("feed lock")
            .take()
            .expect("ScriptedBus supports a single subscription");

        Box::new(ScriptedSubscription {
            rx,
            stats: Arc::clone(&self.stats),
        })
    }
}

struct ScriptedSubscription {
    rx: mpsc::UnboundedReceiver<Delivery>,
    stats: Arc<SubscriptionStats>,
}

#[async_trait]
impl Subscription for ScriptedSubscription {
    async fn recv(&mut self) -> Option<Delivery> {
        if self.stats.is_released() {
            return None;
        }
        self.rx.recv().await
    }

    fn cancel(&mut self) {
        self.stats.cancel_calls.fetch_add(1, Ordering::SeqCst);
        self.stats.released.store(true, Ordering::SeqCst);
        self.rx.close();
    }
}

/// Sending side of a ScriptedBus
pub struct EventFeed {
    tx: Option<mpsc::UnboundedSender<Delivery>>,
}

impl EventFeed {
    pub fn send(&self, delivery: Delivery) {
        if let Some(tx) = &self.tx {
            // The tracker may already be gone; late deliveries are dropped
            let _ = tx.send(delivery);
        }
    }

    pub fn started(&self, id: &str) {
        self.send(Delivery::Event(ChannelEvent::playback_started(
            PlaybackData::new(id, "sound:test"),
        )));
    }

    pub fn finished(&self, id: &str) {
        self.send(Delivery::Event(ChannelEvent::playback_finished(
            PlaybackData::new(id, "sound:test"),
        )));
    }

    pub fn empty(&self) {
        self.send(Delivery::Empty);
    }

    pub fn unrecognized(&self) {
        self.send(Delivery::Event(ChannelEvent::Unrecognized));
    }

    pub fn dtmf(&self, digit: &str) {
        self.send(Delivery::Event(ChannelEvent::ChannelDtmfReceived {
            channel_id: "channel:1".to_string(),
            digit: digit.to_string(),
            timestamp: chrono::Utc::now(),
        }));
    }

    /// Close the stream: the subscription's `recv` yields `None` from now on
    pub fn close(&mut self) {
        self.tx = None;
    }
}
