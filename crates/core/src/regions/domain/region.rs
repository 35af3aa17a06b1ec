use std::fmt;
use std::str::FromStr;

use crate::shared::constants::{DEFAULT_DILATION, DEFAULT_RADIUS, DEFAULT_START};
use crate::shared::error::RegionError;

/// Inpainting algorithm applied to a region.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InpaintMethod {
    /// Fast-marching method (Telea 2004).
    #[default]
    Telea,
    /// Isophote-following diffusion (Bertalmio et al. 2001).
    NavierStokes,
}

impl FromStr for InpaintMethod {
    type Err = RegionError;

    /// Case-insensitive: `telea` or `ns`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "telea" => Ok(Self::Telea),
            "ns" => Ok(Self::NavierStokes),
            _ => Err(RegionError::UnknownMethod(s.to_string())),
        }
    }
}

impl fmt::Display for InpaintMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Telea => write!(f, "telea"),
            Self::NavierStokes => write!(f, "ns"),
        }
    }
}

/// When a region is active. Both bounds are inclusive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TimeWindow {
    Bounded { start: f64, end: f64 },
    /// Active from `start` until the end of the clip.
    OpenEnded { start: f64 },
}

impl TimeWindow {
    pub fn new(start: f64, end: Option<f64>) -> Result<Self, RegionError> {
        if !start.is_finite() {
            return Err(RegionError::NotANumber {
                field: "start",
                value: start.to_string(),
            });
        }
        match end {
            None => Ok(Self::OpenEnded { start }),
            Some(end) if !end.is_finite() => Err(RegionError::NotANumber {
                field: "end",
                value: end.to_string(),
            }),
            Some(end) if end < start => Err(RegionError::EndBeforeStart { start, end }),
            Some(end) => Ok(Self::Bounded { start, end }),
        }
    }

    pub fn start(&self) -> f64 {
        match *self {
            Self::Bounded { start, .. } | Self::OpenEnded { start } => start,
        }
    }

    pub fn end(&self) -> Option<f64> {
        match *self {
            Self::Bounded { end, .. } => Some(end),
            Self::OpenEnded { .. } => None,
        }
    }

    pub fn contains(&self, t: f64) -> bool {
        match *self {
            Self::Bounded { start, end } => t >= start && t <= end,
            Self::OpenEnded { start } => t >= start,
        }
    }
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self::OpenEnded {
            start: DEFAULT_START,
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bounded { start, end } => write!(f, "{start}s-{end}s"),
            Self::OpenEnded { start } => write!(f, "{start}s-end"),
        }
    }
}

/// Axis-aligned rectangle in frame pixel coordinates.
///
/// `x`/`y` may be negative or beyond the frame; clamping happens per frame
/// when the mask is built.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i64, y: i64, width: i64, height: i64) -> Result<Self, RegionError> {
        Ok(Self {
            x: to_i32("x", x)?,
            y: to_i32("y", y)?,
            width: to_positive_u32("width", width)?,
            height: to_positive_u32("height", height)?,
        })
    }
}

/// Per-region inpainting parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InpaintSettings {
    pub radius: f64,
    pub method: InpaintMethod,
    pub dilation: u32,
}

impl InpaintSettings {
    pub fn new(radius: f64, method: InpaintMethod, dilation: i64) -> Result<Self, RegionError> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(RegionError::NonPositiveRadius(radius));
        }
        if dilation < 0 {
            return Err(RegionError::NegativeDilation(dilation));
        }
        let dilation = u32::try_from(dilation).map_err(|_| RegionError::OutOfRange {
            field: "dilation",
            value: dilation,
        })?;
        Ok(Self {
            radius,
            method,
            dilation,
        })
    }
}

impl Default for InpaintSettings {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS,
            method: InpaintMethod::default(),
            dilation: DEFAULT_DILATION,
        }
    }
}

/// A rectangular, time-windowed area of the frame to reconstruct.
///
/// Only constructible from already-validated parts, so every `Region` in
/// a run satisfies its invariants. Immutable once built.
#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    window: TimeWindow,
    rect: Rect,
    settings: InpaintSettings,
}

impl Region {
    pub fn new(window: TimeWindow, rect: Rect, settings: InpaintSettings) -> Self {
        Self {
            window,
            rect,
            settings,
        }
    }

    pub fn window(&self) -> TimeWindow {
        self.window
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn start(&self) -> f64 {
        self.window.start()
    }

    pub fn end(&self) -> Option<f64> {
        self.window.end()
    }

    pub fn radius(&self) -> f64 {
        self.settings.radius
    }

    pub fn method(&self) -> InpaintMethod {
        self.settings.method
    }

    pub fn dilation(&self) -> u32 {
        self.settings.dilation
    }

    pub fn is_active_at(&self, t: f64) -> bool {
        self.window.contains(t)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = &self.rect;
        write!(
            f,
            "[{}] {},{} {}x{} radius={} method={} dilation={}",
            self.window,
            r.x,
            r.y,
            r.width,
            r.height,
            self.settings.radius,
            self.settings.method,
            self.settings.dilation
        )
    }
}

fn to_i32(field: &'static str, value: i64) -> Result<i32, RegionError> {
    i32::try_from(value).map_err(|_| RegionError::OutOfRange { field, value })
}

fn to_positive_u32(field: &'static str, value: i64) -> Result<u32, RegionError> {
    if value <= 0 {
        return Err(RegionError::NonPositiveSize { field, value });
    }
    u32::try_from(value).map_err(|_| RegionError::OutOfRange { field, value })
}
