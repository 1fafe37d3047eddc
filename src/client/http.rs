//! HTTP implementation of [`MonitorApi`]

use super::types::{
    FrameFormat, FrameResponse, SegmentResponse, LAST_RECEIVED_SEGMENT_HEADER, SEGMENT_NAME_HEADER,
};
use super::MonitorApi;
use crate::utils::{MonitorError, MonitorResult};
use async_trait::async_trait;
use std::time::Duration;

/// Talks to the camera server over HTTP
#[derive(Debug, Clone)]
pub struct HttpMonitorClient {
    base_url: String,
    frame_format: FrameFormat,
    client: reqwest::Client,
}

impl HttpMonitorClient {
    /// Create a client rooted at `base_url`.
    ///
    /// `timeout` bounds every request; a request that exceeds it fails with
    /// [`MonitorError::Timeout`].
    pub fn new(base_url: &str, frame_format: FrameFormat, timeout: Option<Duration>) -> MonitorResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            frame_format,
            client: builder.build()?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn frame_url(&self, camera_id: u32) -> String {
        self.url(&format!(
            "frame/{}?format={}",
            camera_id,
            urlencoding::encode(self.frame_format.extension())
        ))
    }

    async fn get_status_only(&self, path: &str) -> MonitorResult<()> {
        let response = self.client.get(self.url(path)).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MonitorError::Status(status.as_u16()));
        }
        Ok(())
    }
}

#[async_trait]
impl MonitorApi for HttpMonitorClient {
    async fn fetch_frame(&self, camera_id: u32) -> MonitorResult<FrameResponse> {
        let response = self.client.get(self.frame_url(camera_id)).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MonitorError::Status(status.as_u16()));
        }

        Ok(response.json::<FrameResponse>().await?)
    }

    async fn fetch_segment(&self, last_received: Option<&str>) -> MonitorResult<SegmentResponse> {
        let mut request = self.client.get(self.url("segment"));
        if let Some(last) = last_received.filter(|id| !id.is_empty()) {
            request = request.header(LAST_RECEIVED_SEGMENT_HEADER, last);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MonitorError::Status(status.as_u16()));
        }

        let id = response
            .headers()
            .get(SEGMENT_NAME_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let payload = response.bytes().await?.to_vec();

        Ok(SegmentResponse { id, payload })
    }

    async fn start_recording(&self) -> MonitorResult<()> {
        self.get_status_only("recording/start").await
    }

    async fn stop_recording(&self) -> MonitorResult<()> {
        self.get_status_only("recording/stop").await
    }
}
