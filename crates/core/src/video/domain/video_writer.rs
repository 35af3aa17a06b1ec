use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::output_codec::OutputCodec;

/// Abstracts video encoding so the pipeline can write output without
/// depending on a specific codec library.
pub trait VideoWriter: Send {
    /// Prepares `path` for frames of `metadata`'s size and frame rate.
    fn open(
        &mut self,
        path: &Path,
        metadata: &VideoMetadata,
        codec: OutputCodec,
    ) -> Result<(), Box<dyn std::error::Error>>;

    fn write(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>>;

    /// Flushes pending frames and finalizes the container. Safe to call
    /// repeatedly; only the first call after `open` does any work.
    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>>;
}
