//! Camera Monitor - live camera feeds with server-side recording control.
//!
//! This is the library crate behind the `camera-monitor` binary. It polls a
//! camera server for still frames and video segments at an adaptive cadence
//! and toggles recording on user request.

pub mod client;
pub mod commands;
pub mod config;
pub mod feed;
pub mod output;
pub mod recorder;
pub mod session;
pub mod utils;

use anyhow::Context;
use client::HttpMonitorClient;
use commands::{handle_command, ConsoleCommand, Flow};
use config::{settings_path, MonitorSettings};
use output::{FileMediaBuffer, LatestFrame};
use recorder::TracingNotifier;
use session::MonitorSession;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Run the monitor until the user quits or presses Ctrl-C
pub fn run() -> anyhow::Result<()> {
    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "camera_monitor_lib=debug,camera_monitor=debug,reqwest=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Camera Monitor v{}", env!("CARGO_PKG_VERSION"));

    let path = settings_path();
    let settings = MonitorSettings::load(&path)
        .with_context(|| format!("failed to load settings from {}", path.display()))?;

    // All feeds share one thread and interleave at their await points.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build runtime")?;

    runtime.block_on(monitor(settings, path))
}

async fn monitor(settings: MonitorSettings, settings_path: PathBuf) -> anyhow::Result<()> {
    let api = Arc::new(
        HttpMonitorClient::new(&settings.server_url, settings.frame_format, settings.request_timeout())
            .context("failed to create HTTP client")?,
    );

    let mut session = MonitorSession::new(settings.clone(), api, Arc::new(TracingNotifier))
        .with_settings_path(settings_path);

    if settings.feed_mode.frames() {
        for &camera_id in &settings.camera_ids {
            session.spawn_frame_feed(camera_id, Arc::new(LatestFrame::new()));
        }
    }

    if settings.feed_mode.segments() {
        let buffer = FileMediaBuffer::open(&settings.segment_output)
            .await
            .with_context(|| format!("failed to open {}", settings.segment_output.display()))?;
        session.spawn_segment_feed(buffer)?;
    }

    tracing::info!("Type 'help' for commands");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    tracing::error!("Failed to listen for Ctrl-C: {}", e);
                }
                break;
            }
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) if line.trim().is_empty() => {}
                Ok(Some(line)) => match line.parse::<ConsoleCommand>() {
                    Ok(command) => {
                        if handle_command(&mut session, command).await == Flow::Quit {
                            break;
                        }
                    }
                    Err(e) => tracing::warn!("{}", e),
                },
                Ok(None) => {
                    tracing::debug!("stdin closed, running until Ctrl-C");
                    stdin_open = false;
                }
                Err(e) => {
                    tracing::warn!("Failed to read stdin: {}", e);
                    stdin_open = false;
                }
            },
        }
    }

    session.shutdown().await;
    Ok(())
}
