//! Timestamp parsing and formatting utilities.
//!
//! Chapter files may carry either plain seconds or clock strings such as
//! `HH:MM:SS`, `MM:SS` and `SS` (each optionally with `.mmm`). Reports and
//! chapter listings render seconds back into clock strings.

use thiserror::Error;

/// Maximum reasonable media duration (24 hours in seconds).
pub const MAX_MEDIA_DURATION_SECS: f64 = 86400.0;

/// Timestamp parsing error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimestampError {
    #[error("Timestamp cannot be empty")]
    Empty,

    #[error("Timestamp cannot be negative")]
    Negative,

    #[error("Invalid {0} value: {1}")]
    InvalidValue(&'static str, String),

    #[error("Invalid timestamp format '{0}'. Use HH:MM:SS, MM:SS or SS (optionally with .mmm)")]
    InvalidFormat(String),

    #[error("Timestamp {0:.1}s exceeds maximum allowed duration")]
    ExceedsMaxDuration(f64),
}

/// Parse a timestamp string to total seconds.
///
/// # Examples
/// ```
/// use vclean_models::timestamp::parse_timestamp;
/// assert_eq!(parse_timestamp("01:30:00").unwrap(), 5400.0);
/// assert_eq!(parse_timestamp("05:30").unwrap(), 330.0);
/// assert_eq!(parse_timestamp("90").unwrap(), 90.0);
/// ```
pub fn parse_timestamp(ts: &str) -> Result<f64, TimestampError> {
    let ts = ts.trim();
    if ts.is_empty() {
        return Err(TimestampError::Empty);
    }

    let parts: Vec<&str> = ts.split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [s] => ("0", "0", *s),
        [m, s] => ("0", *m, *s),
        [h, m, s] => (*h, *m, *s),
        _ => return Err(TimestampError::InvalidFormat(ts.to_string())),
    };

    let hours = parse_component("hours", hours)?;
    let minutes = parse_component("minutes", minutes)?;
    let seconds = parse_component("seconds", seconds)?;

    let total = hours * 3600.0 + minutes * 60.0 + seconds;
    if total > MAX_MEDIA_DURATION_SECS {
        return Err(TimestampError::ExceedsMaxDuration(total));
    }
    Ok(total)
}

fn parse_component(name: &'static str, value: &str) -> Result<f64, TimestampError> {
    let parsed: f64 = value
        .trim()
        .parse()
        .map_err(|_| TimestampError::InvalidValue(name, value.to_string()))?;
    if !parsed.is_finite() {
        return Err(TimestampError::InvalidValue(name, value.to_string()));
    }
    if parsed < 0.0 {
        return Err(TimestampError::Negative);
    }
    Ok(parsed)
}

/// Format seconds as `HH:MM:SS.mmm` (edit reports, logs).
pub fn format_clock(total_secs: f64) -> String {
    let total_secs = total_secs.max(0.0);
    let hours = (total_secs / 3600.0).floor() as u64;
    let mins = ((total_secs % 3600.0) / 60.0).floor() as u64;
    let secs = total_secs % 60.0;
    format!("{:02}:{:02}:{:06.3}", hours, mins, secs)
}

/// Format seconds as `MM:SS`, or `HH:MM:SS` past the first hour.
///
/// Fractional seconds are truncated, which is what video platforms expect
/// in chapter listings.
pub fn format_chapter_timestamp(total_secs: f64) -> String {
    let whole = total_secs.max(0.0).floor() as u64;
    let hours = whole / 3600;
    let mins = (whole % 3600) / 60;
    let secs = whole % 60;
    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, mins, secs)
    } else {
        format!("{:02}:{:02}", mins, secs)
    }
}
