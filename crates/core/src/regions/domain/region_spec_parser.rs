use crate::regions::domain::region::{InpaintMethod, InpaintSettings, Rect, Region, TimeWindow};
use crate::shared::constants::{DEFAULT_DILATION, DEFAULT_RADIUS, DEFAULT_START};
use crate::shared::error::{ConfigurationError, RegionError};

/// Parses one `--region` token into a validated [`Region`].
///
/// Grammar: `[start-end@]x,y,width,height[:radius][:method][:dilation]`
///
/// - The time prefix is optional; when present it must contain `-`, and
///   either side may be empty (`-5` is `0..=5`, `3-` is `3..` open-ended).
///   An empty prefix (`@x,y,w,h`) is the same as no prefix.
/// - The coordinate section is mandatory: exactly four integers.
/// - Optional fields are positional. An empty field keeps its default.
pub fn parse_region_spec(token: &str) -> Result<Region, ConfigurationError> {
    parse(token).map_err(|source| ConfigurationError::InvalidRegionSpec {
        token: token.to_string(),
        source,
    })
}

fn parse(token: &str) -> Result<Region, RegionError> {
    let (time, body) = match token.split_once('@') {
        Some((time, body)) => (Some(time.trim()), body),
        None => (None, token),
    };

    let window = match time {
        Some(range) if !range.is_empty() => parse_time_range(range)?,
        _ => TimeWindow::default(),
    };

    let mut sections = body.split(':');
    let coords = sections.next().unwrap_or_default();
    let rect = parse_coordinates(coords)?;

    let optional: Vec<&str> = sections.map(str::trim).collect();
    if optional.len() > 3 {
        return Err(RegionError::TooManyFields(optional.len()));
    }

    let radius = match optional.first() {
        Some(raw) if !raw.is_empty() => parse_f64("radius", raw)?,
        _ => DEFAULT_RADIUS,
    };
    let method = match optional.get(1) {
        Some(raw) if !raw.is_empty() => raw.parse::<InpaintMethod>()?,
        _ => InpaintMethod::default(),
    };
    let dilation = match optional.get(2) {
        Some(raw) if !raw.is_empty() => parse_i64("dilation", raw)?,
        _ => i64::from(DEFAULT_DILATION),
    };

    let settings = InpaintSettings::new(radius, method, dilation)?;
    Ok(Region::new(window, rect, settings))
}

fn parse_time_range(range: &str) -> Result<TimeWindow, RegionError> {
    let (start, end) = range
        .split_once('-')
        .ok_or_else(|| RegionError::MissingTimeSeparator(range.to_string()))?;

    let start = match start.trim() {
        "" => DEFAULT_START,
        raw => parse_f64("start", raw)?,
    };
    let end = match end.trim() {
        "" => None,
        raw => Some(parse_f64("end", raw)?),
    };
    TimeWindow::new(start, end)
}

fn parse_coordinates(coords: &str) -> Result<Rect, RegionError> {
    let parts: Vec<&str> = coords.split(',').map(str::trim).collect();
    let [x, y, width, height] = parts.as_slice() else {
        return Err(RegionError::WrongCoordinateCount(parts.len()));
    };
    Rect::new(
        parse_i64("x", x)?,
        parse_i64("y", y)?,
        parse_i64("width", width)?,
        parse_i64("height", height)?,
    )
}

fn parse_f64(field: &'static str, raw: &str) -> Result<f64, RegionError> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| RegionError::NotANumber {
            field,
            value: raw.to_string(),
        })
}

fn parse_i64(field: &'static str, raw: &str) -> Result<i64, RegionError> {
    raw.parse::<i64>().map_err(|_| RegionError::NotAnInteger {
        field,
        value: raw.to_string(),
    })
}
