use ndarray::{s, Array2};

use crate::regions::domain::region::{Rect, Region};

/// Rectangle already clamped to a frame, with `x1 < x2` and `y1 < y2`.
///
/// Masks cover it with inclusive bounds, `x1..=x2` × `y1..=y2`, clipped to
/// the last row and column of the frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClampedRect {
    pub x1: usize,
    pub y1: usize,
    pub x2: usize,
    pub y2: usize,
}

impl ClampedRect {
    /// Clamps `rect` to a `width` × `height` frame.
    ///
    /// Returns `None` when nothing of the rectangle lies inside the frame.
    pub fn clamp(rect: &Rect, width: u32, height: u32) -> Option<Self> {
        let (w, h) = (i64::from(width), i64::from(height));
        let x = i64::from(rect.x);
        let y = i64::from(rect.y);
        let x1 = x.clamp(0, w);
        let y1 = y.clamp(0, h);
        let x2 = (x + i64::from(rect.width)).clamp(0, w);
        let y2 = (y + i64::from(rect.height)).clamp(0, h);
        if x2 <= x1 || y2 <= y1 {
            return None;
        }
        Some(Self {
            x1: x1 as usize,
            y1: y1 as usize,
            x2: x2 as usize,
            y2: y2 as usize,
        })
    }
}

/// Single-channel binary mask with the frame's `(height, width)` shape.
/// `true` marks pixels to reconstruct.
#[derive(Clone, Debug, PartialEq)]
pub struct Mask {
    data: Array2<bool>,
}

impl Mask {
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            data: Array2::from_elem((height as usize, width as usize), false),
        }
    }

    /// Fills `rect` with inclusive bounds. Coordinates past the frame are
    /// clipped to its last row or column.
    pub fn from_rect(width: u32, height: u32, rect: ClampedRect) -> Self {
        let mut mask = Self::empty(width, height);
        let (w, h) = (width as usize, height as usize);
        if rect.x1 >= w || rect.y1 >= h {
            return mask;
        }
        let x_last = rect.x2.min(w - 1);
        let y_last = rect.y2.min(h - 1);
        mask.data.slice_mut(s![rect.y1..=y_last, rect.x1..=x_last]).fill(true);
        mask
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    pub fn get(&self, x: usize, y: usize) -> bool {
        self.data[[y, x]]
    }

    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    pub fn is_empty(&self) -> bool {
        !self.data.iter().any(|&v| v)
    }

    /// Morphological dilation with a square structuring element of side
    /// `2 * radius + 1`.
    ///
    /// The square element is separable, so this runs a horizontal then a
    /// vertical running-max pass.
    pub fn dilate(&self, radius: u32) -> Self {
        if radius == 0 {
            return self.clone();
        }
        let r = radius as usize;
        let (h, w) = self.data.dim();

        let mut horizontal = Array2::from_elem((h, w), false);
        for y in 0..h {
            for x in 0..w {
                let lo = x.saturating_sub(r);
                let hi = (x + r + 1).min(w);
                horizontal[[y, x]] = self.data.slice(s![y, lo..hi]).iter().any(|&v| v);
            }
        }

        let mut out = Array2::from_elem((h, w), false);
        for y in 0..h {
            let lo = y.saturating_sub(r);
            let hi = (y + r + 1).min(h);
            for x in 0..w {
                out[[y, x]] = horizontal.slice(s![lo..hi, x]).iter().any(|&v| v);
            }
        }

        Self { data: out }
    }
}

/// Builds the mask for one region against one frame size.
///
/// Returns `None` ("no mask") when the clamped rectangle is empty, which
/// callers treat as a no-op rather than an error.
pub fn build_mask(region: &Region, width: u32, height: u32) -> Option<Mask> {
    let clamped = ClampedRect::clamp(&region.rect(), width, height)?;
    let mask = Mask::from_rect(width, height, clamped);
    Some(mask.dilate(region.dilation()))
}
