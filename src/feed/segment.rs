//! Segmented video feed
//!
//! Polls `segment`, drops anything already seen or empty, and appends the rest
//! to a [`MediaBuffer`]. Each completed append moves the buffer's timeline
//! offset forward by one segment length so segments play back to back.

use super::bus::{ConfigBus, Subscription};
use super::dedup::DedupGate;
use super::scheduler::{AdaptiveScheduler, TickOutcome};
use super::state::{subscribe_cadence, Cadence, FeedState, SharedFeedState};
use super::Feed;
use crate::client::MonitorApi;
use crate::output::MediaBuffer;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;

/// The single segment feed of a session
pub struct SegmentFeedLoop<B: MediaBuffer> {
    api: Arc<dyn MonitorApi>,
    buffer: B,
    scheduler: AdaptiveScheduler,
    state: SharedFeedState,
    _subscription: Subscription,
}

impl<B: MediaBuffer> SegmentFeedLoop<B> {
    /// Create the loop and subscribe it to segment length changes on `bus`
    pub fn new(segment_length_secs: f64, api: Arc<dyn MonitorApi>, buffer: B, bus: &Arc<ConfigBus>) -> Self {
        let state = Arc::new(RwLock::new(FeedState::new(Cadence::SegmentLength(
            segment_length_secs,
        ))));
        let subscription = subscribe_cadence(bus, &state);

        Self {
            api,
            buffer,
            scheduler: AdaptiveScheduler::new(),
            state,
            _subscription: subscription,
        }
    }

    pub fn buffer(&self) -> &B {
        &self.buffer
    }

    /// Decide whether a fetched segment should be appended.
    ///
    /// On acceptance `last_accepted_id` is replaced and the offset step (the
    /// current segment length) is returned.
    fn accept(&self, id: &str, payload_len: usize) -> Option<f64> {
        let mut state = self.state.write();
        if !DedupGate::is_new(id, &state.last_accepted_id) {
            tracing::trace!("Segment {} already appended", id);
            return None;
        }
        if payload_len == 0 {
            tracing::trace!("Segment {} has an empty payload", id);
            return None;
        }

        state.last_accepted_id = id.to_string();
        Some(state.cadence.seconds_per_artifact())
    }
}

#[async_trait]
impl<B: MediaBuffer> Feed for SegmentFeedLoop<B> {
    fn name(&self) -> String {
        "Segment feed".to_string()
    }

    fn state(&self) -> &SharedFeedState {
        &self.state
    }

    fn scheduler(&self) -> &AdaptiveScheduler {
        &self.scheduler
    }

    async fn tick(&mut self) -> TickOutcome {
        let hint = {
            let state = self.state.read();
            Some(state.last_accepted_id.clone()).filter(|id| !id.is_empty())
        };

        let response = match self.api.fetch_segment(hint.as_deref()).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Failed to fetch segment: {}", e);
                return TickOutcome::Failed;
            }
        };

        let Some(id) = response.id else {
            tracing::debug!("Segment response without an identifier, skipping");
            return TickOutcome::Missed;
        };

        let Some(step) = self.accept(&id, response.payload.len()) else {
            return TickOutcome::Missed;
        };

        let len = response.payload.len();
        if let Err(e) = self.buffer.append(response.payload).await {
            tracing::error!("Failed to append segment {}: {}", id, e);
            return TickOutcome::Failed;
        }

        let offset = self.buffer.timestamp_offset() + step;
        self.buffer.set_timestamp_offset(offset);
        tracing::debug!("Appended segment {} ({} bytes), next offset {:.3}s", id, len, offset);

        TickOutcome::Delivered
    }
}
