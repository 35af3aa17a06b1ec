use std::fmt;
use std::path::Path;

use crate::shared::constants::{MJPEG_EXTENSIONS, MPEG4_EXTENSIONS};

/// Encoder family for the output file, chosen from its extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputCodec {
    /// MPEG-4 Part 2, for `.mp4`, `.mov` and `.m4v`.
    Mpeg4,
    /// Motion JPEG, for `.avi`.
    Mjpeg,
}

impl OutputCodec {
    /// Picks the codec for `path`. Unknown or missing extensions fall back
    /// to MPEG-4 Part 2.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        if MJPEG_EXTENSIONS.contains(&ext.as_str()) {
            Self::Mjpeg
        } else if MPEG4_EXTENSIONS.contains(&ext.as_str()) {
            Self::Mpeg4
        } else {
            log::warn!(
                "Unrecognized output extension '{ext}' for {}, falling back to {}",
                path.display(),
                Self::FALLBACK
            );
            Self::FALLBACK
        }
    }

    pub const FALLBACK: Self = Self::Mpeg4;
}

impl fmt::Display for OutputCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mpeg4 => write!(f, "mpeg4"),
            Self::Mjpeg => write!(f, "mjpeg"),
        }
    }
}
