//! Scripted [`MonitorApi`] used by unit tests

use super::types::{FrameResponse, SegmentResponse};
use super::MonitorApi;
use crate::utils::{MonitorError, MonitorResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::Instant;

/// Replays queued responses; an exhausted queue answers "nothing new"
#[derive(Default)]
pub(crate) struct ScriptedApi {
    frames: Mutex<VecDeque<MonitorResult<FrameResponse>>>,
    segments: Mutex<VecDeque<MonitorResult<SegmentResponse>>>,
    recording: Mutex<VecDeque<MonitorResult<()>>>,
    pub segment_hints: Mutex<Vec<Option<String>>>,
    pub recording_calls: Mutex<Vec<&'static str>>,
    pub frame_requests: AtomicUsize,
    pub segment_requests: AtomicUsize,
    /// When each fetch started
    pub fetch_starts: Mutex<Vec<Instant>>,
    latency: Option<Duration>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    gate: Option<Arc<Semaphore>>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recording requests block until [`ScriptedApi::release`] is called
    pub fn gated() -> Self {
        Self {
            gate: Some(Arc::new(Semaphore::new(0))),
            ..Self::default()
        }
    }

    /// Every frame and segment fetch takes `latency` to answer
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::default()
        }
    }

    /// Milliseconds between consecutive fetch starts
    pub fn fetch_gaps_ms(&self) -> Vec<u128> {
        self.fetch_starts
            .lock()
            .windows(2)
            .map(|pair| (pair[1] - pair[0]).as_millis())
            .collect()
    }

    async fn begin_fetch(&self) {
        self.fetch_starts.lock().push(Instant::now());
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    pub fn release(&self, permits: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(permits);
        }
    }

    pub fn push_frame(&self, image: Option<&str>) {
        self.frames.lock().push_back(Ok(FrameResponse {
            image: image.map(str::to_string),
        }));
    }

    pub fn push_frame_error(&self, error: MonitorError) {
        self.frames.lock().push_back(Err(error));
    }

    pub fn push_segment(&self, id: Option<&str>, len: usize) {
        self.segments.lock().push_back(Ok(SegmentResponse {
            id: id.map(str::to_string),
            payload: vec![0xAB; len],
        }));
    }

    pub fn push_segment_error(&self, error: MonitorError) {
        self.segments.lock().push_back(Err(error));
    }

    pub fn push_recording(&self, result: MonitorResult<()>) {
        self.recording.lock().push_back(result);
    }

    async fn recording_round_trip(&self, action: &'static str) -> MonitorResult<()> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.recording_calls.lock().push(action);

        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.recording.lock().pop_front().unwrap_or(Ok(()))
    }
}

#[async_trait]
impl MonitorApi for ScriptedApi {
    async fn fetch_frame(&self, _camera_id: u32) -> MonitorResult<FrameResponse> {
        self.frame_requests.fetch_add(1, Ordering::SeqCst);
        self.begin_fetch().await;
        self.frames
            .lock()
            .pop_front()
            .unwrap_or(Ok(FrameResponse { image: None }))
    }

    async fn fetch_segment(&self, last_received: Option<&str>) -> MonitorResult<SegmentResponse> {
        self.segment_requests.fetch_add(1, Ordering::SeqCst);
        self.begin_fetch().await;
        self.segment_hints.lock().push(last_received.map(str::to_string));
        self.segments.lock().pop_front().unwrap_or(Ok(SegmentResponse {
            id: None,
            payload: Vec::new(),
        }))
    }

    async fn start_recording(&self) -> MonitorResult<()> {
        self.recording_round_trip("start").await
    }

    async fn stop_recording(&self) -> MonitorResult<()> {
        self.recording_round_trip("stop").await
    }
}
