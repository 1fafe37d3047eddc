//! Per-loop feed state
//!
//! Each feed loop owns one [`FeedState`]. The loop's own iterations update the
//! dedup identifier and counters; the cadence is the only field written from
//! outside, by the loop's [`ConfigBus`] subscription.

use super::bus::{ConfigBus, ConfigEvent, Subscription};
use super::scheduler::{frame_interval, segment_interval, TickOutcome};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Target cadence of a feed loop
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Cadence {
    /// Frame preview rate
    FramesPerSecond(f64),
    /// Segment length in seconds; the loop polls several times per segment
    SegmentLength(f64),
}

impl Cadence {
    /// Period between fetch starts
    pub fn target_interval(&self) -> Duration {
        match *self {
            Cadence::FramesPerSecond(fps) => frame_interval(fps),
            Cadence::SegmentLength(secs) => segment_interval(secs),
        }
    }

    /// Playback time covered by one artifact, in seconds
    pub fn seconds_per_artifact(&self) -> f64 {
        match *self {
            Cadence::FramesPerSecond(fps) => 1.0 / fps,
            Cadence::SegmentLength(secs) => secs,
        }
    }

    /// Apply a config event addressed to this kind of cadence.
    ///
    /// Returns `true` if the cadence changed.
    pub fn apply(&mut self, event: &ConfigEvent) -> bool {
        let (slot, value) = match (self, *event) {
            (Cadence::FramesPerSecond(fps), ConfigEvent::FpsChanged(value)) => (fps, value),
            (Cadence::SegmentLength(secs), ConfigEvent::SegmentLengthChanged(value)) => (secs, value),
            _ => return false,
        };

        if !is_valid_cadence(value) {
            tracing::warn!("Ignoring invalid cadence value {}", value);
            return false;
        }
        *slot = value;
        true
    }
}

/// Cadence values must be positive and finite
pub fn is_valid_cadence(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Counters reported by the `status` command
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedStats {
    pub delivered: u64,
    pub missed: u64,
    pub failed: u64,
    pub last_delivered_at: Option<DateTime<Utc>>,
}

impl FeedStats {
    /// Count one tick
    pub fn record(&mut self, outcome: TickOutcome) {
        match outcome {
            TickOutcome::Delivered => {
                self.delivered += 1;
                self.last_delivered_at = Some(Utc::now());
            }
            TickOutcome::Missed => self.missed += 1,
            TickOutcome::Failed => self.failed += 1,
        }
    }
}

/// State owned by a single feed loop
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedState {
    /// Identifier of the last accepted artifact; empty until the first one
    pub last_accepted_id: String,
    pub cadence: Cadence,
    /// True until the loop observes cancellation
    pub running: bool,
    pub stats: FeedStats,
}

impl FeedState {
    pub fn new(cadence: Cadence) -> Self {
        Self {
            last_accepted_id: String::new(),
            cadence,
            running: true,
            stats: FeedStats::default(),
        }
    }
}

/// Feed state shared between a loop, its bus subscription and status readers
pub type SharedFeedState = Arc<RwLock<FeedState>>;

/// Subscribe `state` to cadence changes published on `bus`
pub fn subscribe_cadence(bus: &Arc<ConfigBus>, state: &SharedFeedState) -> Subscription {
    let state = Arc::clone(state);
    bus.subscribe_scoped(move |event| {
        let mut state = state.write();
        if state.cadence.apply(event) {
            tracing::debug!("Cadence now {:?}", state.cadence);
        }
    })
}
