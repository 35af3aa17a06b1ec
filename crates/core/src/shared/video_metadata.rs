use std::path::PathBuf;

use crate::shared::constants::FALLBACK_FPS;

#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    /// `None` when the container does not report a frame count.
    pub total_frames: Option<usize>,
    pub codec: String,
    pub source_path: Option<PathBuf>,
}

impl VideoMetadata {
    /// The source frame rate, or [`FALLBACK_FPS`] when it is missing or
    /// non-positive, so timestamps derived from it stay monotonic.
    pub fn effective_fps(&self) -> f64 {
        if self.fps.is_finite() && self.fps > 0.0 {
            self.fps
        } else {
            FALLBACK_FPS
        }
    }

    /// Timestamp in seconds of the frame at `frame_index`.
    pub fn timestamp(&self, frame_index: usize) -> f64 {
        frame_index as f64 / self.effective_fps()
    }
}
