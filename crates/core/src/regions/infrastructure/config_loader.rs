use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::regions::domain::region::{InpaintMethod, InpaintSettings, Rect, Region, TimeWindow};
use crate::shared::constants::{
    DEFAULT_DILATION, DEFAULT_METHOD, DEFAULT_RADIUS, DEFAULT_START, TOML_EXTENSIONS,
};
use crate::shared::error::{ConfigurationError, RegionError};

const KNOWN_KEYS: &[&str] = &[
    "start", "end", "x", "y", "width", "height", "radius", "method", "dilation",
];

/// Contents of a config file after validation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LoadedConfig {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    /// In file order. May be empty; emptiness is checked after merging
    /// with CLI regions.
    pub regions: Vec<Region>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    /// `.toml` files are TOML, everything else is read as JSON.
    pub fn from_path(path: &Path) -> Self {
        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| TOML_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false);
        if is_toml {
            Self::Toml
        } else {
            Self::Json
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawConfigFile {
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    regions: Option<Vec<Map<String, Value>>>,
}

/// Reads and validates a region config file.
pub fn load_config(path: &Path) -> Result<LoadedConfig, ConfigurationError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigurationError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config(&content, ConfigFormat::from_path(path), path)?;
    log::debug!(
        "Loaded {} region(s) from {}",
        config.regions.len(),
        path.display()
    );
    Ok(config)
}

/// Parses config text. `path` is only used in error messages.
pub fn parse_config(
    content: &str,
    format: ConfigFormat,
    path: &Path,
) -> Result<LoadedConfig, ConfigurationError> {
    let malformed = |message: String| ConfigurationError::MalformedConfig {
        path: path.to_path_buf(),
        message,
    };
    let raw: RawConfigFile = match format {
        ConfigFormat::Json => serde_json::from_str(content).map_err(|e| malformed(e.to_string()))?,
        ConfigFormat::Toml => toml::from_str(content).map_err(|e| malformed(e.to_string()))?,
    };

    let entries = raw
        .regions
        .ok_or_else(|| ConfigurationError::MissingRegions(path.to_path_buf()))?;

    let regions = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            parse_entry(index, entry)
                .map_err(|source| ConfigurationError::InvalidRegionEntry { index, source })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(LoadedConfig {
        input: raw.input,
        output: raw.output,
        regions,
    })
}

fn parse_entry(index: usize, entry: &Map<String, Value>) -> Result<Region, RegionError> {
    for key in entry.keys() {
        if !KNOWN_KEYS.contains(&key.as_str()) {
            log::warn!("Ignoring unknown key '{key}' in region entry #{index}");
        }
    }

    let rect = Rect::new(
        required_int(entry, "x")?,
        required_int(entry, "y")?,
        required_int(entry, "width")?,
        required_int(entry, "height")?,
    )?;

    let start = optional_f64(entry, "start")?.unwrap_or(DEFAULT_START);
    let end = optional_f64(entry, "end")?;
    let window = TimeWindow::new(start, end)?;

    let radius = optional_f64(entry, "radius")?.unwrap_or(DEFAULT_RADIUS);
    let method = match present(entry, "method") {
        None => DEFAULT_METHOD.parse::<InpaintMethod>()?,
        Some(Value::String(s)) => s.parse::<InpaintMethod>()?,
        Some(other) => return Err(RegionError::UnknownMethod(other.to_string())),
    };
    let dilation = match present(entry, "dilation") {
        None => i64::from(DEFAULT_DILATION),
        Some(value) => as_int("dilation", value)?,
    };

    let settings = InpaintSettings::new(radius, method, dilation)?;
    Ok(Region::new(window, rect, settings))
}

/// The value under `key`, treating an explicit `null` as absent.
fn present<'a>(entry: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    entry.get(key).filter(|v| !v.is_null())
}

fn required_int(entry: &Map<String, Value>, field: &'static str) -> Result<i64, RegionError> {
    let value = present(entry, field).ok_or(RegionError::MissingField(field))?;
    as_int(field, value)
}

fn as_int(field: &'static str, value: &Value) -> Result<i64, RegionError> {
    value.as_i64().ok_or_else(|| RegionError::NotAnInteger {
        field,
        value: value.to_string(),
    })
}

fn optional_f64(
    entry: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<f64>, RegionError> {
    present(entry, field)
        .map(|value| {
            value.as_f64().ok_or_else(|| RegionError::NotANumber {
                field,
                value: value.to_string(),
            })
        })
        .transpose()
}
