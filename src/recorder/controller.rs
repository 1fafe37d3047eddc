//! Recording toggle controller
//!
//! Sends one start or stop request per user activation. The control stays
//! disabled for the whole round trip and activations that arrive while it is
//! disabled are dropped, so at most one request is ever outstanding.

use super::state::{RecordingAction, RecordingState, TogglePhase, ToggleControl};
use crate::client::MonitorApi;
use crate::utils::{ErrorResponse, MonitorError};
use chrono::Utc;
use parking_lot::Mutex;
use std::sync::Arc;

/// Receives user-visible failure notices
pub trait FailureNotifier: Send + Sync {
    fn notify(&self, notice: &ErrorResponse);
}

/// Reports failures through the log
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl FailureNotifier for TracingNotifier {
    fn notify(&self, notice: &ErrorResponse) {
        tracing::error!("{} ({})", notice.message, notice.code);
    }
}

/// What an activation did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// The control was disabled; no request was sent
    Ignored,
    /// The server confirmed the action
    Completed(RecordingAction),
    /// The request failed; the label was left unchanged
    Failed(RecordingAction),
}

/// Re-enables the control when a round trip ends, even if it was cancelled
struct RoundTrip<'a> {
    control: &'a Mutex<ToggleControl>,
}

impl Drop for RoundTrip<'_> {
    fn drop(&mut self) {
        let mut control = self.control.lock();
        control.enabled = true;
        control.pending = None;
    }
}

/// Serializes start/stop requests against the server
pub struct RecordingController {
    api: Arc<dyn MonitorApi>,
    control: Mutex<ToggleControl>,
    notifier: Arc<dyn FailureNotifier>,
}

impl RecordingController {
    /// Create a controller whose control shows `initial` state
    pub fn new(api: Arc<dyn MonitorApi>, initial: RecordingState, notifier: Arc<dyn FailureNotifier>) -> Self {
        Self {
            api,
            control: Mutex::new(ToggleControl::new(initial)),
            notifier,
        }
    }

    /// Snapshot of the control
    pub fn control(&self) -> ToggleControl {
        self.control.lock().clone()
    }

    pub fn state(&self) -> RecordingState {
        self.control.lock().state()
    }

    pub fn phase(&self) -> TogglePhase {
        self.control.lock().phase()
    }

    /// Handle one user activation of the control
    pub async fn activate(&self) -> Activation {
        let action = {
            let mut control = self.control.lock();
            if !control.enabled {
                tracing::debug!("Recording control busy, ignoring activation");
                return Activation::Ignored;
            }
            let action = control.state().next_action();
            control.enabled = false;
            control.pending = Some(action);
            action
        };
        let round_trip = RoundTrip {
            control: &self.control,
        };

        tracing::info!("Requesting recording {:?}", action);
        let result = match action {
            RecordingAction::Start => self.api.start_recording().await,
            RecordingAction::Stop => self.api.stop_recording().await,
        };

        if result.is_ok() {
            let state = action.resulting_state();
            let mut control = self.control.lock();
            control.label = state.label().to_string();
            control.recording_since = match state {
                RecordingState::Recording => Some(Utc::now()),
                RecordingState::NotRecording => None,
            };
        }
        drop(round_trip);

        match result {
            Ok(()) => {
                tracing::info!("Recording {:?} confirmed", action);
                Activation::Completed(action)
            }
            Err(e) => {
                tracing::warn!("Recording {:?} failed: {}", action, e);
                let notice = ErrorResponse {
                    message: action.failure_message().to_string(),
                    ..ErrorResponse::from(MonitorError::Recording(e.to_string()))
                };
                self.notifier.notify(&notice);
                Activation::Failed(action)
            }
        }
    }
}
