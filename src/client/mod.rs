//! Request surface consumed by the feeds and the recording controller
//!
//! The endpoints are abstracted behind [`MonitorApi`] so the loops can be
//! driven by the HTTP client in production and by scripted fakes in tests.

pub mod http;
pub mod types;

#[cfg(test)]
pub(crate) mod mock;

pub use http::HttpMonitorClient;
pub use types::{FrameFormat, FrameResponse, SegmentResponse};

use crate::utils::MonitorResult;
use async_trait::async_trait;

/// Operations the monitor client performs against the server
#[async_trait]
pub trait MonitorApi: Send + Sync {
    /// `GET frame/{camera_id}`
    async fn fetch_frame(&self, camera_id: u32) -> MonitorResult<FrameResponse>;

    /// `GET segment`, hinting the last accepted identifier when there is one
    async fn fetch_segment(&self, last_received: Option<&str>) -> MonitorResult<SegmentResponse>;

    /// `GET recording/start`
    async fn start_recording(&self) -> MonitorResult<()>;

    /// `GET recording/stop`
    async fn stop_recording(&self) -> MonitorResult<()>;
}
