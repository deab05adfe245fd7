//! telplay - play a media reference and report how the playback ended
//!
//! Runs the playback tracker against the loopback player, which emulates the
//! remote control plane on an in-process event bus. Ctrl+C cancels the wait.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use telplay::loopback::{LoopbackBehavior, LoopbackPlayer};
use telplay::PlaybackTimeouts;
use telplay_common::config::TomlConfig;
use telplay_common::events::EventBus;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for telplay
#[derive(Parser, Debug)]
#[command(name = "telplay")]
#[command(about = "Play media to a channel and track the playback to completion")]
#[command(version)]
struct Args {
    /// Media reference to play
    #[arg(default_value = "sound:hello-world")]
    media_uri: String,

    /// Configuration file
    #[arg(short, long, env = "TELPLAY_CONFIG")]
    config: Option<PathBuf>,

    /// Override the start window (milliseconds)
    #[arg(long)]
    start_timeout_ms: Option<u64>,

    /// Override the maximum playback time (milliseconds)
    #[arg(long)]
    max_playback_ms: Option<u64>,

    /// Loopback: delay before the start notification (milliseconds)
    #[arg(long, default_value = "50")]
    start_delay_ms: u64,

    /// Loopback: time between start and finish notifications (milliseconds)
    #[arg(long, default_value = "2000")]
    duration_ms: u64,

    /// Loopback: never publish the start notification
    #[arg(long)]
    no_start: bool,

    /// Loopback: never publish the finish notification
    #[arg(long)]
    no_finish: bool,

    /// Report the start separately before waiting for the stop
    #[arg(long = "async")]
    report_start: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = TomlConfig::load_or_default(args.config.as_deref(), "TELPLAY_CONFIG")
        .context("Failed to load configuration")?
        .with_overrides(args.start_timeout_ms, args.max_playback_ms)
        .context("Invalid timeout override")?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("telplay={0},telplay_common={0}", config.logging.level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let timeouts = PlaybackTimeouts::from(&config.playback);

    let bus = EventBus::new(config.event_bus_capacity);
    let player = LoopbackPlayer::new(
        bus.clone(),
        LoopbackBehavior {
            start_delay: Duration::from_millis(args.start_delay_ms),
            duration: Duration::from_millis(args.duration_ms),
            emit_start: !args.no_start,
            emit_finish: !args.no_finish,
            ..Default::default()
        },
    )
    .with_target("channel:loopback");

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_shutdown(cancel.clone()));

    info!(media_uri = %args.media_uri, ?timeouts, "Starting playback");

    let result = if args.report_start {
        let playback = telplay::play_async_with(&bus, &player, &args.media_uri, timeouts)
            .await
            .context("Failed to start playback")?;
        info!(playback_id = %playback.id(), "Playback accepted");

        tokio::select! {
            _ = cancel.cancelled() => Err(telplay::Error::Cancelled),
            result = async {
                playback.started().await;
                info!(playback_id = %playback.id(), "Start signal set");
                playback.wait().await
            } => result,
        }
    } else {
        telplay::play_sync_with(&cancel, &bus, &player, &args.media_uri, timeouts).await
    };

    match result {
        Ok(()) => {
            info!("Playback completed");
            Ok(())
        }
        Err(e) if e.is_timeout() => {
            warn!("Playback timed out: {}", e);
            Err(e.into())
        }
        Err(e) => {
            error!("Playback failed: {}", e);
            Err(e.into())
        }
    }
}

/// Cancel `token` on Ctrl+C or SIGTERM
async fn cancel_on_shutdown(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, cancelling playback");
        },
        _ = terminate => {
            info!("Received terminate signal, cancelling playback");
        },
    }
    token.cancel();
}
