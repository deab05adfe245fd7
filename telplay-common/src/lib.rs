//! # Telplay Common Library
//!
//! Shared code for the telplay playback tracker including:
//! - Channel event types (ChannelEvent enum) and the subscription capability
//! - In-process EventBus
//! - Configuration loading
//! - Common error types

pub mod config;
pub mod error;
pub mod events;

pub use error::{Error, Result};
