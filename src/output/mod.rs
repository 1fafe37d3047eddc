//! Output surfaces fed by the loops
//!
//! - [`FrameTarget`]: a renderable element that accepts an image reference
//! - [`MediaBuffer`]: a streaming buffer that accepts opaque segment bytes

pub mod frame_target;
pub mod media_buffer;

pub use frame_target::{FrameTarget, LatestFrame, RenderedFrame};
pub use media_buffer::{FileMediaBuffer, MediaBuffer};
