/// Frame rate assumed when the source reports none (or a non-positive one).
pub const FALLBACK_FPS: f64 = 30.0;

pub const DEFAULT_START: f64 = 0.0;
pub const DEFAULT_RADIUS: f64 = 3.0;
pub const DEFAULT_DILATION: u32 = 0;
pub const DEFAULT_METHOD: &str = "telea";

/// Output extensions encoded with Motion JPEG.
pub const MJPEG_EXTENSIONS: &[&str] = &["avi"];

/// Output extensions encoded with MPEG-4 Part 2.
pub const MPEG4_EXTENSIONS: &[&str] = &["mp4", "mov", "m4v"];

pub const TOML_EXTENSIONS: &[&str] = &["toml"];
