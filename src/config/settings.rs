//! Settings file
//!
//! Settings live in a camelCase JSON file. Every field has a default, so a
//! missing file or a partial one is fine. The preview fps is written back when
//! the user changes it.

use crate::client::FrameFormat;
use crate::feed::state::is_valid_cadence;
use crate::utils::{MonitorError, MonitorResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming the settings file
pub const SETTINGS_ENV: &str = "CAMERA_MONITOR_SETTINGS";

const DEFAULT_SETTINGS_FILE: &str = "camera-monitor.json";

/// Which feeds a session runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedMode {
    /// Still-image preview per camera
    Frames,
    /// Segmented video into the media buffer
    Segments,
    Both,
}

impl FeedMode {
    pub fn frames(&self) -> bool {
        matches!(self, FeedMode::Frames | FeedMode::Both)
    }

    pub fn segments(&self) -> bool {
        matches!(self, FeedMode::Segments | FeedMode::Both)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MonitorSettings {
    /// Base URL of the camera server
    pub server_url: String,

    pub feed_mode: FeedMode,

    /// Cameras to preview
    pub camera_ids: Vec<u32>,

    /// Preview frames per second
    pub fps: f64,

    /// Length of one video segment in seconds
    pub segment_length_secs: f64,

    pub frame_format: FrameFormat,

    /// Per-request timeout; `None` waits indefinitely
    pub request_timeout_ms: Option<u64>,

    /// Retry delay after a preview poll that returned no image
    pub frame_miss_backoff_ms: Option<u64>,

    /// File the segment feed appends to
    pub segment_output: PathBuf,

    /// Whether the server was recording when the session started
    pub initially_recording: bool,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8080/".to_string(),
            feed_mode: FeedMode::Both,
            camera_ids: vec![0],
            fps: 10.0,
            segment_length_secs: 4.0,
            frame_format: FrameFormat::Jpg,
            request_timeout_ms: Some(10_000),
            frame_miss_backoff_ms: None,
            segment_output: PathBuf::from("live-feed.mp4"),
            initially_recording: false,
        }
    }
}

impl MonitorSettings {
    /// Read settings from `path`, falling back to defaults when it does not exist
    pub fn load(path: &Path) -> MonitorResult<Self> {
        if !path.exists() {
            tracing::info!("No settings at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let settings: MonitorSettings = serde_json::from_str(&content)?;
        settings.validate()?;

        tracing::debug!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Write settings to `path` without blocking the runtime thread
    pub async fn save(&self, path: &Path) -> MonitorResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;

        tracing::debug!("Saved settings to {:?}", path);
        Ok(())
    }

    /// Reject values the feeds cannot run with
    pub fn validate(&self) -> MonitorResult<()> {
        if self.server_url.trim().is_empty() {
            return Err(MonitorError::Config("serverUrl must not be empty".to_string()));
        }
        if !is_valid_cadence(self.fps) {
            return Err(MonitorError::Config(format!("fps must be positive, got {}", self.fps)));
        }
        if !is_valid_cadence(self.segment_length_secs) {
            return Err(MonitorError::Config(format!(
                "segmentLengthSecs must be positive, got {}",
                self.segment_length_secs
            )));
        }
        if self.feed_mode.frames() && self.camera_ids.is_empty() {
            return Err(MonitorError::Config("cameraIds must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    pub fn frame_miss_backoff(&self) -> Option<Duration> {
        self.frame_miss_backoff_ms.map(Duration::from_millis)
    }
}

/// Settings file location: `$CAMERA_MONITOR_SETTINGS` or `camera-monitor.json`
pub fn settings_path() -> PathBuf {
    std::env::var_os(SETTINGS_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let settings = MonitorSettings::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(settings, MonitorSettings::default());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut settings = MonitorSettings::default();
        settings.fps = 2.5;
        settings.camera_ids = vec![1, 2];
        settings.feed_mode = FeedMode::Frames;
        settings.save(&path).await.unwrap();

        let loaded = MonitorSettings::load(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "fps": 24, "frameFormat": "png" }"#).unwrap();

        let loaded = MonitorSettings::load(&path).unwrap();
        assert_eq!(loaded.fps, 24.0);
        assert_eq!(loaded.frame_format, FrameFormat::Png);
        assert_eq!(loaded.segment_length_secs, 4.0);
        assert_eq!(loaded.request_timeout(), Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");

        fs::write(&path, r#"{ "fps": 0 }"#).unwrap();
        assert!(matches!(MonitorSettings::load(&path), Err(MonitorError::Config(_))));

        fs::write(&path, r#"{ "segmentLengthSecs": -1 }"#).unwrap();
        assert!(matches!(MonitorSettings::load(&path), Err(MonitorError::Config(_))));

        fs::write(&path, r#"{ "cameraIds": [] }"#).unwrap();
        assert!(matches!(MonitorSettings::load(&path), Err(MonitorError::Config(_))));

        fs::write(&path, "not json").unwrap();
        assert!(matches!(MonitorSettings::load(&path), Err(MonitorError::Serialization(_))));
    }

    #[test]
    fn test_feed_mode() {
        assert!(FeedMode::Both.frames() && FeedMode::Both.segments());
        assert!(FeedMode::Frames.frames() && !FeedMode::Frames.segments());
        assert!(!FeedMode::Segments.frames() && FeedMode::Segments.segments());
    }
}
