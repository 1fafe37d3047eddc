//! Recording state as seen by the client
//!
//! The client never asks the server whether it is recording. The state is
//! read off the toggle control's label, which only changes after a successful
//! round trip.

use chrono::{DateTime, Utc};
use serde::Serialize;

pub const START_LABEL: &str = "Start Recording";
pub const STOP_LABEL: &str = "Stop Recording";

/// Server-side recording state implied by the control label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RecordingState {
    NotRecording,
    Recording,
}

impl Default for RecordingState {
    fn default() -> Self {
        Self::NotRecording
    }
}

impl RecordingState {
    /// A label offering "start" means nothing is being recorded
    pub fn from_label(label: &str) -> Self {
        if label.to_uppercase().contains("START") {
            Self::NotRecording
        } else {
            Self::Recording
        }
    }

    /// Label offering the opposite action
    pub fn label(&self) -> &'static str {
        match self {
            Self::NotRecording => START_LABEL,
            Self::Recording => STOP_LABEL,
        }
    }

    /// Action a click on the control requests
    pub fn next_action(&self) -> RecordingAction {
        match self {
            Self::NotRecording => RecordingAction::Start,
            Self::Recording => RecordingAction::Stop,
        }
    }
}

/// A start or stop request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingAction {
    Start,
    Stop,
}

impl RecordingAction {
    /// State after the server confirmed this action
    pub fn resulting_state(&self) -> RecordingState {
        match self {
            Self::Start => RecordingState::Recording,
            Self::Stop => RecordingState::NotRecording,
        }
    }

    pub fn failure_message(&self) -> &'static str {
        match self {
            Self::Start => "Error starting recording",
            Self::Stop => "Error stopping recording",
        }
    }
}

/// Where the controller is in its round trip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", content = "state", rename_all = "camelCase")]
pub enum TogglePhase {
    Idle(RecordingState),
    AwaitingStart,
    AwaitingStop,
}

/// The interactive start/stop control
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleControl {
    pub label: String,
    pub enabled: bool,
    /// Request currently outstanding, if any
    pub pending: Option<RecordingAction>,
    /// When the server last confirmed a start
    pub recording_since: Option<DateTime<Utc>>,
}

impl ToggleControl {
    pub fn new(state: RecordingState) -> Self {
        Self {
            label: state.label().to_string(),
            enabled: true,
            pending: None,
            recording_since: None,
        }
    }

    pub fn state(&self) -> RecordingState {
        RecordingState::from_label(&self.label)
    }

    pub fn phase(&self) -> TogglePhase {
        match self.pending {
            Some(RecordingAction::Start) => TogglePhase::AwaitingStart,
            Some(RecordingAction::Stop) => TogglePhase::AwaitingStop,
            None => TogglePhase::Idle(self.state()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_from_label() {
        assert_eq!(RecordingState::from_label("Start Recording"), RecordingState::NotRecording);
        assert_eq!(RecordingState::from_label("start recording"), RecordingState::NotRecording);
        assert_eq!(RecordingState::from_label("Stop Recording"), RecordingState::Recording);
    }

    #[test]
    fn test_label_round_trip() {
        for state in [RecordingState::NotRecording, RecordingState::Recording] {
            assert_eq!(RecordingState::from_label(state.label()), state);
            assert_eq!(state.next_action().resulting_state(), match state {
                RecordingState::NotRecording => RecordingState::Recording,
                RecordingState::Recording => RecordingState::NotRecording,
            });
        }
    }

    #[test]
    fn test_phase_follows_pending() {
        let mut control = ToggleControl::new(RecordingState::NotRecording);
        assert_eq!(control.phase(), TogglePhase::Idle(RecordingState::NotRecording));

        control.pending = Some(RecordingAction::Start);
        assert_eq!(control.phase(), TogglePhase::AwaitingStart);

        control.pending = Some(RecordingAction::Stop);
        assert_eq!(control.phase(), TogglePhase::AwaitingStop);
    }
}
