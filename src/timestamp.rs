//! Timestamp notation parsing.
//!
//! Segment boundaries are written as `ss[.f]`, `mm:ss[.f]`, or
//! `hh:mm:ss[.f]`. [`parse_time`] normalizes all three into fractional
//! seconds; [`format_time`] renders seconds back for log lines.
//!
//! # Example
//!
//! ```
//! use framesift::parse_time;
//!
//! assert_eq!(parse_time("90")?, 90.0);
//! assert_eq!(parse_time("01:30")?, 90.0);
//! assert_eq!(parse_time("1:02:03.5")?, 3723.5);
//! # Ok::<(), framesift::FramesiftError>(())
//! ```

use crate::error::FramesiftError;

/// Parse a textual timestamp into a non-negative number of seconds.
///
/// Hours and minutes must be whole numbers; only the rightmost (seconds)
/// field may carry a fractional part.
///
/// # Errors
///
/// Returns [`FramesiftError::MalformedTimestamp`] if a component is empty,
/// non-numeric, negative, or non-finite, or if there are more than three
/// colon-separated components.
pub fn parse_time(text: &str) -> Result<f64, FramesiftError> {
    let trimmed = text.trim();
    let parts: Vec<&str> = trimmed.split(':').collect();

    match parts.as_slice() {
        [seconds] => parse_seconds(text, seconds),
        [minutes, seconds] => {
            let minutes = parse_whole(text, minutes, "minutes")?;
            Ok(minutes as f64 * 60.0 + parse_seconds(text, seconds)?)
        }
        [hours, minutes, seconds] => {
            let hours = parse_whole(text, hours, "hours")?;
            let minutes = parse_whole(text, minutes, "minutes")?;
            Ok(hours as f64 * 3600.0 + minutes as f64 * 60.0 + parse_seconds(text, seconds)?)
        }
        _ => Err(malformed(
            text,
            format!("expected at most 3 components, found {}", parts.len()),
        )),
    }
}

/// Render seconds as `mm:ss.fff`, or `h:mm:ss.fff` past the hour.
pub fn format_time(seconds: f64) -> String {
    let total_millis = (seconds.max(0.0) * 1000.0).round() as u64;
    let millis = total_millis % 1000;
    let total_seconds = total_millis / 1000;
    let secs = total_seconds % 60;
    let minutes = (total_seconds / 60) % 60;
    let hours = total_seconds / 3600;

    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}.{millis:03}")
    } else {
        format!("{minutes:02}:{secs:02}.{millis:03}")
    }
}

fn parse_seconds(input: &str, component: &str) -> Result<f64, FramesiftError> {
    let component = component.trim();
    if component.is_empty() {
        return Err(malformed(input, "empty seconds component"));
    }
    if component.starts_with('-') {
        return Err(malformed(input, format!("{component:?} is negative")));
    }

    let value: f64 = component
        .parse()
        .map_err(|_| malformed(input, format!("{component:?} is not a number")))?;

    if !value.is_finite() {
        return Err(malformed(input, format!("{component:?} is not finite")));
    }
    Ok(value)
}

fn parse_whole(input: &str, component: &str, field: &str) -> Result<u64, FramesiftError> {
    let component = component.trim();
    if component.is_empty() {
        return Err(malformed(input, format!("empty {field} component")));
    }
    if component.starts_with('-') {
        return Err(malformed(input, format!("{field} {component:?} is negative")));
    }

    component
        .parse()
        .map_err(|_| malformed(input, format!("{field} {component:?} is not a whole number")))
}

fn malformed(input: &str, reason: impl Into<String>) -> FramesiftError {
    FramesiftError::MalformedTimestamp {
        input: input.to_string(),
        reason: reason.into(),
    }
}
