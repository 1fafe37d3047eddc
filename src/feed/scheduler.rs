//! Adaptive fetch scheduling
//!
//! Keeps the start-to-start cadence of a feed loop close to its target by
//! waiting only for the remainder of the period after each fetch-and-apply
//! cycle.

use std::time::Duration;

/// Segment loops poll this many times per segment length
pub const SEGMENT_POLLS_PER_LENGTH: f64 = 4.0;

/// Longest period a feed will ever wait between fetches
pub const MAX_INTERVAL: Duration = Duration::from_secs(3600);

/// Result of a single feed iteration, as seen by the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A new artifact was rendered or appended
    Delivered,
    /// The fetch succeeded but there was nothing new
    Missed,
    /// The fetch or apply step failed
    Failed,
}

/// Computes the delay before the next fetch attempt
#[derive(Debug, Clone, Copy, Default)]
pub struct AdaptiveScheduler {
    /// Fixed delay applied after a miss instead of the adaptive remainder
    miss_backoff: Option<Duration>,
}

impl AdaptiveScheduler {
    /// Scheduler that always waits out the remainder of the period
    pub fn new() -> Self {
        Self { miss_backoff: None }
    }

    /// Scheduler that retries after `backoff` when a tick produced nothing new
    pub fn with_miss_backoff(backoff: Duration) -> Self {
        Self {
            miss_backoff: Some(backoff),
        }
    }

    /// `max(0, target - elapsed)`
    pub fn next_delay(target: Duration, elapsed: Duration) -> Duration {
        target.saturating_sub(elapsed)
    }

    /// Delay for the next tick given how the previous one went
    pub fn delay_after(&self, outcome: TickOutcome, target: Duration, elapsed: Duration) -> Duration {
        match (outcome, self.miss_backoff) {
            (TickOutcome::Missed, Some(backoff)) => backoff,
            _ => Self::next_delay(target, elapsed),
        }
    }
}

/// Target period for a frame feed running at `fps`
pub fn frame_interval(fps: f64) -> Duration {
    clamped_interval(1.0 / fps)
}

/// Target period for the segment feed given the segment length in seconds
pub fn segment_interval(segment_length_secs: f64) -> Duration {
    clamped_interval(segment_length_secs / SEGMENT_POLLS_PER_LENGTH)
}

/// Seconds to a `Duration`, capped at [`MAX_INTERVAL`]
fn clamped_interval(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs)
        .map(|interval| interval.min(MAX_INTERVAL))
        .unwrap_or(MAX_INTERVAL)
}
