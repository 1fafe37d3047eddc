//! Recording control
//!
//! - `state`: recording state inferred from the toggle control
//! - `controller`: one-request-at-a-time start/stop round trips

pub mod controller;
pub mod state;

pub use controller::{Activation, FailureNotifier, RecordingController, TracingNotifier};
pub use state::{RecordingAction, RecordingState, ToggleControl, TogglePhase};
