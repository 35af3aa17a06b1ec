use crate::inpainting::domain::frame_inpainter::FrameInpainter;
use crate::inpainting::domain::mask::Mask;
use crate::regions::domain::region::InpaintMethod;
use crate::shared::frame::Frame;

use super::{navier_stokes, telea};

/// Pure-Rust inpainter covering both methods on packed 8-bit frames.
pub struct CpuInpainter;

impl CpuInpainter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CpuInpainter {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameInpainter for CpuInpainter {
    fn inpaint(
        &self,
        frame: &Frame,
        mask: &Mask,
        radius: f64,
        method: InpaintMethod,
    ) -> Result<Frame, Box<dyn std::error::Error>> {
        let width = frame.width() as usize;
        let height = frame.height() as usize;
        let channels = frame.channels() as usize;

        if mask.width() != width || mask.height() != height {
            return Err(format!(
                "mask is {}x{} but frame is {width}x{height}",
                mask.width(),
                mask.height()
            )
            .into());
        }
        if !(1..=4).contains(&channels) {
            return Err(format!("unsupported channel count: {channels}").into());
        }
        if !radius.is_finite() || radius <= 0.0 {
            return Err(format!("radius must be positive, got {radius}").into());
        }

        let mut data = frame.data().to_vec();
        match method {
            InpaintMethod::Telea => {
                telea::inpaint(&mut data, width, height, channels, mask, radius)
            }
            InpaintMethod::NavierStokes => {
                navier_stokes::inpaint(&mut data, width, height, channels, mask, radius)
            }
        }
        Ok(frame.with_data(data))
    }
}
