use crate::inpainting::domain::mask::Mask;
use crate::regions::domain::region::InpaintMethod;
use crate::shared::frame::Frame;

/// Reconstructs the masked pixels of a frame from their surroundings.
///
/// Implementations must not modify `frame`; the reconstructed frame is
/// returned so callers can fold successive regions over it.
pub trait FrameInpainter: Send {
    fn inpaint(
        &self,
        frame: &Frame,
        mask: &Mask,
        radius: f64,
        method: InpaintMethod,
    ) -> Result<Frame, Box<dyn std::error::Error>>;
}
