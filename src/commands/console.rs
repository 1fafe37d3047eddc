//! Console commands
//!
//! ```text
//! record            toggle server-side recording
//! fps <n>           change the preview frame rate
//! segment <secs>    change the segment length
//! status            log the session status
//! quit              end the session
//! ```

use crate::recorder::Activation;
use crate::session::MonitorSession;
use crate::utils::{MonitorError, MonitorResult};
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConsoleCommand {
    Record,
    Fps(f64),
    SegmentLength(f64),
    Status,
    Help,
    Quit,
}

impl FromStr for ConsoleCommand {
    type Err = MonitorError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let command = parts.next().unwrap_or_default().to_lowercase();
        let argument = parts.next();

        let number = |name: &str| -> MonitorResult<f64> {
            argument
                .ok_or_else(|| MonitorError::Config(format!("{} needs a value", name)))?
                .parse::<f64>()
                .map_err(|e| MonitorError::Config(format!("invalid {} value: {}", name, e)))
        };

        match command.as_str() {
            "record" | "r" => Ok(ConsoleCommand::Record),
            "fps" => Ok(ConsoleCommand::Fps(number("fps")?)),
            "segment" => Ok(ConsoleCommand::SegmentLength(number("segment")?)),
            "status" | "s" => Ok(ConsoleCommand::Status),
            "help" | "?" => Ok(ConsoleCommand::Help),
            "quit" | "q" | "exit" => Ok(ConsoleCommand::Quit),
            other => Err(MonitorError::Config(format!("unknown command '{}'", other))),
        }
    }
}

/// Whether the console keeps reading after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Apply one command to the session
pub async fn handle_command(session: &mut MonitorSession, command: ConsoleCommand) -> Flow {
    match command {
        ConsoleCommand::Record => {
            // Runs in the background so the console stays responsive; the
            // controller drops activations while a request is outstanding.
            let controller = Arc::clone(session.recording());
            tokio::spawn(async move {
                if controller.activate().await == Activation::Ignored {
                    tracing::info!("Recording request already in progress");
                }
            });
        }
        ConsoleCommand::Fps(fps) => match session.set_fps(fps).await {
            Ok(notified) => tracing::info!("Preview rate set to {} fps ({} feed(s))", fps, notified),
            Err(e) => tracing::warn!("{}", e),
        },
        ConsoleCommand::SegmentLength(secs) => match session.set_segment_length(secs).await {
            Ok(notified) => tracing::info!("Segment length set to {}s ({} feed(s))", secs, notified),
            Err(e) => tracing::warn!("{}", e),
        },
        ConsoleCommand::Status => match serde_json::to_string_pretty(&session.status()) {
            Ok(status) => tracing::info!("Session status:\n{}", status),
            Err(e) => tracing::warn!("Failed to render status: {}", e),
        },
        ConsoleCommand::Help => {
            tracing::info!("Commands: record | fps <n> | segment <secs> | status | quit");
        }
        ConsoleCommand::Quit => return Flow::Quit,
    }
    Flow::Continue
}
