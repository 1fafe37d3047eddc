//! Image render targets

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

/// Something that displays the most recent camera image
pub trait FrameTarget: Send + Sync {
    /// Replace the displayed image source
    fn set_source(&self, image: String);

    /// Most recently rendered frame, for targets that keep one
    fn rendered(&self) -> Option<RenderedFrame> {
        None
    }
}

/// The image currently shown by a [`LatestFrame`]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedFrame {
    pub image: String,
    pub rendered_at: DateTime<Utc>,
}

/// Keeps the latest image reference in memory
#[derive(Debug, Default)]
pub struct LatestFrame {
    current: RwLock<Option<RenderedFrame>>,
}

impl LatestFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently displayed frame, if any has been rendered
    pub fn current(&self) -> Option<RenderedFrame> {
        self.current.read().clone()
    }

    pub fn source(&self) -> Option<String> {
        self.current.read().as_ref().map(|frame| frame.image.clone())
    }
}

impl FrameTarget for LatestFrame {
    fn set_source(&self, image: String) {
        *self.current.write() = Some(RenderedFrame {
            image,
            rendered_at: Utc::now(),
        });
    }

    fn rendered(&self) -> Option<RenderedFrame> {
        self.current()
    }
}
