use std::path::PathBuf;

use thiserror::Error;

/// A single field of a region failed validation.
///
/// Raised while building a [`Region`](crate::regions::domain::region::Region)
/// and always wrapped in a [`ConfigurationError`] that names the raw token
/// or config entry it came from.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RegionError {
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("{field} must be a number, got '{value}'")]
    NotANumber { field: &'static str, value: String },

    #[error("{field} must be an integer, got '{value}'")]
    NotAnInteger { field: &'static str, value: String },

    #[error("{field} must be a positive integer, got {value}")]
    NonPositiveSize { field: &'static str, value: i64 },

    #[error("{field} is out of range: {value}")]
    OutOfRange { field: &'static str, value: i64 },

    #[error("radius must be a positive number, got {0}")]
    NonPositiveRadius(f64),

    #[error("dilation must be a non-negative integer, got {0}")]
    NegativeDilation(i64),

    #[error("method must be 'telea' or 'ns', got '{0}'")]
    UnknownMethod(String),

    #[error("end ({end}) must not be before start ({start})")]
    EndBeforeStart { start: f64, end: f64 },

    #[error("time range '{0}' must have the form start-end")]
    MissingTimeSeparator(String),

    #[error("expected 4 comma-separated coordinates x,y,width,height, got {0}")]
    WrongCoordinateCount(usize),

    #[error("expected at most 3 optional fields radius:method:dilation, got {0}")]
    TooManyFields(usize),
}

/// Invalid user input detected before any frame is processed.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("invalid region '{token}': {source}")]
    InvalidRegionSpec {
        token: String,
        #[source]
        source: RegionError,
    },

    #[error("invalid region entry #{index} in config: {source}")]
    InvalidRegionEntry {
        index: usize,
        #[source]
        source: RegionError,
    },

    #[error("malformed config file {}: {message}", path.display())]
    MalformedConfig { path: PathBuf, message: String },

    #[error("failed to read config file {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config file {} has no 'regions' list", .0.display())]
    MissingRegions(PathBuf),

    #[error("no input path given (use --input or the config 'input' key)")]
    MissingInput,

    #[error("no output path given (use --output or the config 'output' key)")]
    MissingOutput,

    #[error("no regions given (use --region or the config 'regions' list)")]
    NoRegions,

    #[error("output file already exists: {} (pass --overwrite to replace it)", .0.display())]
    OutputExists(PathBuf),
}

/// Video open/read/write failures.
///
/// Adapter errors arrive as `Box<dyn Error>` and are flattened to their
/// message so this type stays `Send + Sync`.
#[derive(Debug, Error)]
pub enum VideoIoError {
    #[error("input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("failed to open {} for reading: {message}", path.display())]
    ReaderOpen { path: PathBuf, message: String },

    #[error("failed to open {} for writing: {message}", path.display())]
    WriterOpen { path: PathBuf, message: String },

    #[error("failed to read frame {frame}: {message}")]
    Read { frame: usize, message: String },

    #[error("failed to write frame {frame}: {message}")]
    Write { frame: usize, message: String },

    #[error("failed to finalize {}: {message}", path.display())]
    Close { path: PathBuf, message: String },
}

#[derive(Debug, Error)]
pub enum UnburnError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("I/O error: {0}")]
    Io(#[from] VideoIoError),

    #[error("inpainting failed on frame {frame}: {message}")]
    Inpaint { frame: usize, message: String },

    #[error("processor already executed")]
    AlreadyExecuted,
}

pub type Result<T> = std::result::Result<T, UnburnError>;
