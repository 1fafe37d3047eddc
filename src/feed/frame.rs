//! Still-image preview feed, one per camera

use super::bus::{ConfigBus, Subscription};
use super::scheduler::{AdaptiveScheduler, TickOutcome};
use super::state::{subscribe_cadence, Cadence, FeedState, SharedFeedState};
use super::Feed;
use crate::client::{FrameResponse, MonitorApi};
use crate::output::FrameTarget;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;

/// Polls `frame/{camera_id}` and renders whatever image the server has
pub struct FrameFeedLoop {
    camera_id: u32,
    api: Arc<dyn MonitorApi>,
    target: Arc<dyn FrameTarget>,
    scheduler: AdaptiveScheduler,
    state: SharedFeedState,
    _subscription: Subscription,
}

impl FrameFeedLoop {
    /// Create the loop and subscribe it to fps changes on `bus`
    pub fn new(
        camera_id: u32,
        fps: f64,
        api: Arc<dyn MonitorApi>,
        target: Arc<dyn FrameTarget>,
        scheduler: AdaptiveScheduler,
        bus: &Arc<ConfigBus>,
    ) -> Self {
        let state = Arc::new(RwLock::new(FeedState::new(Cadence::FramesPerSecond(fps))));
        let subscription = subscribe_cadence(bus, &state);

        Self {
            camera_id,
            api,
            target,
            scheduler,
            state,
            _subscription: subscription,
        }
    }
}

#[async_trait]
impl Feed for FrameFeedLoop {
    fn name(&self) -> String {
        format!("Frame feed for camera {}", self.camera_id)
    }

    fn state(&self) -> &SharedFeedState {
        &self.state
    }

    fn scheduler(&self) -> &AdaptiveScheduler {
        &self.scheduler
    }

    async fn tick(&mut self) -> TickOutcome {
        match self.api.fetch_frame(self.camera_id).await {
            Ok(FrameResponse { image: Some(image) }) => {
                self.target.set_source(image);
                TickOutcome::Delivered
            }
            Ok(FrameResponse { image: None }) => {
                tracing::debug!("No image available for camera {}", self.camera_id);
                TickOutcome::Missed
            }
            Err(e) => {
                tracing::warn!("Failed to fetch frame for camera {}: {}", self.camera_id, e);
                TickOutcome::Failed
            }
        }
    }
}
