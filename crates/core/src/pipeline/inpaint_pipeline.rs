use crate::inpainting::domain::frame_inpainter::FrameInpainter;
use crate::inpainting::domain::mask::build_mask;
use crate::regions::domain::region::Region;
use crate::shared::frame::Frame;

/// Applies the active regions of one frame, one after another.
///
/// Each region's mask is built against the output of the previous step and
/// inpainted with that region's own radius and method, so overlapping
/// regions resolve in set order.
pub struct InpaintPipeline {
    inpainter: Box<dyn FrameInpainter>,
}

impl InpaintPipeline {
    pub fn new(inpainter: Box<dyn FrameInpainter>) -> Self {
        Self { inpainter }
    }

    /// Folds `active` over `frame`. Regions that clamp to nothing are skipped.
    pub fn apply(
        &self,
        frame: Frame,
        active: &[&Region],
    ) -> Result<Frame, Box<dyn std::error::Error>> {
        active.iter().try_fold(frame, |result, region| {
            match build_mask(region, result.width(), result.height()) {
                Some(mask) => {
                    self.inpainter
                        .inpaint(&result, &mask, region.radius(), region.method())
                }
                None => {
                    log::trace!(
                        "Region {region} lies outside frame {}, skipping",
                        result.index()
                    );
                    Ok(result)
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inpainting::domain::mask::Mask;
    use crate::inpainting::infrastructure::cpu_inpainter::CpuInpainter;
    use crate::regions::domain::region::InpaintMethod;
    use crate::regions::domain::region_spec_parser::parse_region_spec;
    use std::sync::{Arc, Mutex};

    /// Records each call and stamps the masked pixels with a per-call value,
    /// so the output shows which call touched a pixel last.
    struct StampingInpainter {
        calls: Arc<Mutex<Vec<(usize, f64, InpaintMethod)>>>,
    }

    impl FrameInpainter for StampingInpainter {
        fn inpaint(
            &self,
            frame: &Frame,
            mask: &Mask,
            radius: f64,
            method: InpaintMethod,
        ) -> Result<Frame, Box<dyn std::error::Error>> {
            let mut calls = self.calls.lock().unwrap();
            calls.push((mask.count(), radius, method));
            let stamp = calls.len() as u8 * 10;

            let mut data = frame.data().to_vec();
            let channels = frame.channels() as usize;
            for y in 0..mask.height() {
                for x in 0..mask.width() {
                    if mask.get(x, y) {
                        let i = (y * mask.width() + x) * channels;
                        data[i..i + channels].fill(stamp);
                    }
                }
            }
            Ok(frame.with_data(data))
        }
    }

    struct FailingInpainter;

    impl FrameInpainter for FailingInpainter {
        fn inpaint(
            &self,
            _frame: &Frame,
            _mask: &Mask,
            _radius: f64,
            _method: InpaintMethod,
        ) -> Result<Frame, Box<dyn std::error::Error>> {
            Err("inpaint exploded".into())
        }
    }

    type Calls = Arc<Mutex<Vec<(usize, f64, InpaintMethod)>>>;

    fn stamping_pipeline() -> (InpaintPipeline, Calls) {
        let calls: Calls = Arc::new(Mutex::new(Vec::new()));
        let pipeline = InpaintPipeline::new(Box::new(StampingInpainter {
            calls: calls.clone(),
        }));
        (pipeline, calls)
    }

    fn frame(w: u32, h: u32, value: u8) -> Frame {
        Frame::new(vec![value; (w * h * 3) as usize], w, h, 3, 7)
    }

    fn region(token: &str) -> Region {
        parse_region_spec(token).unwrap()
    }

    fn pixel(frame: &Frame, x: usize, y: usize) -> u8 {
        frame.data()[(y * frame.width() as usize + x) * 3]
    }

    #[test]
    fn test_no_active_regions_returns_frame_unchanged() {
        let (pipeline, calls) = stamping_pipeline();
        let input = frame(10, 10, 50);
        let out = pipeline.apply(input.clone(), &[]).unwrap();
        assert_eq!(out, input);
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_regions_applied_in_order() {
        // Two overlapping regions: B's stamp must win where they overlap.
        let (pipeline, calls) = stamping_pipeline();
        let a = region("0,0,6,6:2:telea");
        let b = region("3,3,6,6:5:ns");

        let out = pipeline.apply(frame(10, 10, 0), &[&a, &b]).unwrap();

        let calls = calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![(49, 2.0, InpaintMethod::Telea), (49, 5.0, InpaintMethod::NavierStokes)]
        );
        assert_eq!(pixel(&out, 1, 1), 10, "only A covers (1,1)");
        assert_eq!(pixel(&out, 4, 4), 20, "B is applied after A");
        assert_eq!(pixel(&out, 8, 8), 20, "only B covers (8,8)");
        assert_eq!(pixel(&out, 9, 0), 0, "untouched");
    }

    #[test]
    fn test_reversed_order_gives_different_result() {
        let (pipeline, _) = stamping_pipeline();
        let a = region("0,0,6,6");
        let b = region("3,3,6,6");

        let ab = pipeline.apply(frame(10, 10, 0), &[&a, &b]).unwrap();
        let (pipeline, _) = stamping_pipeline();
        let ba = pipeline.apply(frame(10, 10, 0), &[&b, &a]).unwrap();

        assert_ne!(pixel(&ab, 4, 4), pixel(&ba, 4, 4));
    }

    #[test]
    fn test_one_call_per_region_not_union() {
        let (pipeline, calls) = stamping_pipeline();
        let a = region("0,0,2,2");
        let b = region("5,5,2,2");
        pipeline.apply(frame(10, 10, 0), &[&a, &b]).unwrap();
        let masks: Vec<usize> = calls.lock().unwrap().iter().map(|c| c.0).collect();
        assert_eq!(masks, vec![9, 9]);
    }

    #[test]
    fn test_region_outside_frame_is_skipped() {
        let (pipeline, calls) = stamping_pipeline();
        let outside = region("500,500,10,10");
        let inside = region("1,1,2,2");

        let out = pipeline
            .apply(frame(10, 10, 0), &[&outside, &inside])
            .unwrap();

        assert_eq!(calls.lock().unwrap().len(), 1);
        assert_eq!(pixel(&out, 1, 1), 10);
    }

    #[test]
    fn test_inpainter_error_propagates() {
        let pipeline = InpaintPipeline::new(Box::new(FailingInpainter));
        let r = region("0,0,2,2");
        let err = pipeline.apply(frame(4, 4, 0), &[&r]).unwrap_err();
        assert_eq!(err.to_string(), "inpaint exploded");
    }

    #[test]
    fn test_real_inpainter_erases_overlay() {
        let pipeline = InpaintPipeline::new(Box::new(CpuInpainter::new()));
        let mut input = frame(20, 20, 80);
        // Burn a white "caption" into the frame.
        for y in 14..17 {
            for x in 4..16 {
                let i = (y * 20 + x) * 3;
                input.data_mut()[i..i + 3].fill(255);
            }
        }
        let caption = region("4,14,12,3:3:telea:1");

        let out = pipeline.apply(input, &[&caption]).unwrap();

        assert!(out.data().iter().all(|&v| v == 80));
        assert_eq!(out.index(), 7);
    }
}
