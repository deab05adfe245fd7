//! Subscription that always has a delivery ready
//!
//! Models a shared stream busy with other playbacks' traffic: every `recv`
//! yields once and then returns immediately with either an event for another
//! playback or an empty delivery.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use telplay_common::events::{ChannelEvent, Delivery, PlaybackData, Subscriber, Subscription};

#[derive(Debug, Default)]
pub struct FloodStats {
    delivered: AtomicUsize,
    released: AtomicBool,
}

impl FloodStats {
    pub fn delivered(&self) -> usize {
        self.delivered.load(Ordering::SeqCst)
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

pub struct FloodingBus {
    other_id: String,
    own_start: Option<String>,
    stats: Arc<FloodStats>,
}

impl FloodingBus {
    /// Flood with traffic for `other_id` only
    pub fn new(other_id: &str) -> Self {
        Self {
            other_id: other_id.to_string(),
            own_start: None,
            stats: Arc::new(FloodStats::default()),
        }
    }

    /// Deliver a start notification for `playback_id` first, then flood
    pub fn starting(mut self, playback_id: &str) -> Self {
        self.own_start = Some(playback_id.to_string());
        self
    }

    pub fn stats(&self) -> Arc<FloodStats> {
        Arc::clone(&self.stats)
    }
}

impl Subscriber for FloodingBus {
    fn subscribe(&self, _event_types: &[&str]) -> Box<dyn Subscription> {
        Box::new(FloodingSubscription {
            other_id: self.other_id.clone(),
            own_start: self.own_start.clone(),
            stats: Arc::clone(&self.stats),
        })
    }
}

struct FloodingSubscription {
    other_id: String,
    own_start: Option<String>,
    stats: Arc<FloodStats>,
}

#[async_trait]
impl Subscription for FloodingSubscription {
    async fn recv(&mut self) -> Option<Delivery> {
        if self.stats.is_released() {
            return None;
        }
        tokio::task::yield_now().await;

        if let Some(id) = self.own_start.take() {
            return Some(Delivery::Event(ChannelEvent::playback_started(
                PlaybackData::new(id, "sound:test"),
            )));
        }

        let n = self.stats.delivered.fetch_add(1, Ordering::SeqCst);
        if n % 2 == 0 {
            Some(Delivery::Event(ChannelEvent::playback_started(
                PlaybackData::new(self.other_id.clone(), "sound:other"),
            )))
        } else {
            Some(Delivery::Empty)
        }
    }

    fn cancel(&mut self) {
        self.stats.released.store(true, Ordering::SeqCst);
    }
}
