//! Monitoring session
//!
//! A session owns everything with a lifetime: the config bus, the feed tasks,
//! the cancellation token that stops them and the recording controller.
//! Dropping the session without calling [`MonitorSession::shutdown`] still
//! cancels the feeds, but does not wait for them.

use crate::client::MonitorApi;
use crate::config::MonitorSettings;
use crate::feed::state::is_valid_cadence;
use crate::feed::{
    run_feed, AdaptiveScheduler, ConfigBus, ConfigEvent, Feed, FeedState, FrameFeedLoop,
    SegmentFeedLoop, SharedFeedState,
};
use crate::output::{FrameTarget, MediaBuffer};
use crate::recorder::{FailureNotifier, RecordingController, RecordingState, ToggleControl, TogglePhase};
use crate::utils::{MonitorError, MonitorResult};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};
use uuid::Uuid;

/// Snapshot of one running feed
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedStatus {
    pub name: String,
    pub state: FeedState,
}

/// What a camera's render target is currently showing
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraFrameStatus {
    pub camera_id: u32,
    pub last_rendered_at: Option<DateTime<Utc>>,
    pub image_bytes: usize,
}

/// Snapshot reported by the `status` command
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub recording: ToggleControl,
    pub recording_phase: TogglePhase,
    pub feeds: Vec<FeedStatus>,
    pub frames: Vec<CameraFrameStatus>,
}

pub struct MonitorSession {
    id: Uuid,
    started_at: DateTime<Utc>,
    settings: MonitorSettings,
    settings_path: Option<PathBuf>,
    api: Arc<dyn MonitorApi>,
    bus: Arc<ConfigBus>,
    cancel: CancellationToken,
    _cancel_on_drop: DropGuard,
    tasks: Vec<JoinHandle<()>>,
    feeds: Vec<FeedStatusHandle>,
    targets: Vec<(u32, Arc<dyn FrameTarget>)>,
    has_segment_feed: bool,
    recording: Arc<RecordingController>,
}

struct FeedStatusHandle {
    name: String,
    state: SharedFeedState,
}

impl MonitorSession {
    /// Start a session. No feeds run until they are spawned.
    pub fn new(settings: MonitorSettings, api: Arc<dyn MonitorApi>, notifier: Arc<dyn FailureNotifier>) -> Self {
        let cancel = CancellationToken::new();
        let initial = if settings.initially_recording {
            RecordingState::Recording
        } else {
            RecordingState::NotRecording
        };
        let recording = Arc::new(RecordingController::new(Arc::clone(&api), initial, notifier));
        let id = Uuid::new_v4();

        tracing::info!("Monitor session {} started against {}", id, settings.server_url);

        Self {
            id,
            started_at: Utc::now(),
            settings,
            settings_path: None,
            api,
            bus: Arc::new(ConfigBus::new()),
            _cancel_on_drop: cancel.clone().drop_guard(),
            cancel,
            tasks: Vec::new(),
            feeds: Vec::new(),
            targets: Vec::new(),
            has_segment_feed: false,
            recording,
        }
    }

    /// Persist cadence changes to `path`
    pub fn with_settings_path(mut self, path: PathBuf) -> Self {
        self.settings_path = Some(path);
        self
    }

    pub fn settings(&self) -> &MonitorSettings {
        &self.settings
    }

    pub fn bus(&self) -> &Arc<ConfigBus> {
        &self.bus
    }

    pub fn recording(&self) -> &Arc<RecordingController> {
        &self.recording
    }

    /// Start polling stills for `camera_id` into `target`
    pub fn spawn_frame_feed(&mut self, camera_id: u32, target: Arc<dyn FrameTarget>) -> SharedFeedState {
        let scheduler = match self.settings.frame_miss_backoff() {
            Some(backoff) => AdaptiveScheduler::with_miss_backoff(backoff),
            None => AdaptiveScheduler::new(),
        };
        self.targets.push((camera_id, Arc::clone(&target)));
        let feed = FrameFeedLoop::new(
            camera_id,
            self.settings.fps,
            Arc::clone(&self.api),
            target,
            scheduler,
            &self.bus,
        );
        self.spawn(feed)
    }

    /// Start the segment feed. A session has at most one.
    pub fn spawn_segment_feed<B: MediaBuffer + 'static>(&mut self, buffer: B) -> MonitorResult<SharedFeedState> {
        if self.has_segment_feed {
            return Err(MonitorError::Config("segment feed already running".to_string()));
        }
        let feed = SegmentFeedLoop::new(
            self.settings.segment_length_secs,
            Arc::clone(&self.api),
            buffer,
            &self.bus,
        );
        self.has_segment_feed = true;
        Ok(self.spawn(feed))
    }

    fn spawn<F: Feed + 'static>(&mut self, feed: F) -> SharedFeedState {
        let state = Arc::clone(feed.state());
        self.feeds.push(FeedStatusHandle {
            name: feed.name(),
            state: Arc::clone(&state),
        });
        self.tasks.push(tokio::spawn(run_feed(feed, self.cancel.child_token())));
        state
    }

    /// Change the preview cadence of every frame feed.
    ///
    /// Returns the number of subscribers notified. Feeds see the new rate
    /// before the settings file is written.
    pub async fn set_fps(&mut self, fps: f64) -> MonitorResult<usize> {
        if !is_valid_cadence(fps) {
            return Err(MonitorError::Config(format!("fps must be positive, got {}", fps)));
        }
        self.settings.fps = fps;
        let notified = self.bus.publish(ConfigEvent::FpsChanged(fps));
        self.persist_settings().await;
        Ok(notified)
    }

    /// Change the segment length used by the segment feed
    pub async fn set_segment_length(&mut self, secs: f64) -> MonitorResult<usize> {
        if !is_valid_cadence(secs) {
            return Err(MonitorError::Config(format!(
                "segment length must be positive, got {}",
                secs
            )));
        }
        self.settings.segment_length_secs = secs;
        let notified = self.bus.publish(ConfigEvent::SegmentLengthChanged(secs));
        self.persist_settings().await;
        Ok(notified)
    }

    async fn persist_settings(&self) {
        if let Some(path) = &self.settings_path {
            if let Err(e) = self.settings.save(path).await {
                tracing::warn!("Failed to persist settings to {:?}: {}", path, e);
            }
        }
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            session_id: self.id,
            started_at: self.started_at,
            recording: self.recording.control(),
            recording_phase: self.recording.phase(),
            feeds: self
                .feeds
                .iter()
                .map(|feed| FeedStatus {
                    name: feed.name.clone(),
                    state: feed.state.read().clone(),
                })
                .collect(),
            frames: self
                .targets
                .iter()
                .map(|(camera_id, target)| {
                    let rendered = target.rendered();
                    CameraFrameStatus {
                        camera_id: *camera_id,
                        last_rendered_at: rendered.as_ref().map(|frame| frame.rendered_at),
                        image_bytes: rendered.map_or(0, |frame| frame.image.len()),
                    }
                })
                .collect(),
        }
    }

    /// Cancel every feed and wait for them to finish
    pub async fn shutdown(self) {
        tracing::info!("Shutting down monitor session {}", self.id);
        self.cancel.cancel();

        for task in self.tasks {
            if let Err(e) = task.await {
                tracing::error!("Feed task ended abnormally: {}", e);
            }
        }
        tracing::info!("Monitor session {} ended", self.id);
    }
}
