//! Angle conversions and text forms.
//!
//! Angles are stored in radians and shown in degrees. Text output truncates
//! rather than rounds. The `_below` formatters also take an exclusive limit,
//! so a value below it such as 360 degrees never renders as the limit itself.

use crate::error::{Error, Result};

/// Hundredths of an arc-second per degree.
const DMS_UNITS_PER_DEGREE: f64 = 360_000.0;

/// Micro-degrees per degree.
const DECIMAL_UNITS_PER_DEGREE: f64 = 1_000_000.0;

/// Absorbs representation error so that exact values do not truncate
/// to the unit below.
const TRUNCATION_GUARD: f64 = 1e-6;

/// Converts degrees to radians.
#[must_use]
pub fn degrees_to_radians(degrees: f64) -> f64 {
    degrees * std::f64::consts::PI / 180.0
}

/// Converts radians to degrees.
#[must_use]
pub fn radians_to_degrees(radians: f64) -> f64 {
    radians * 180.0 / std::f64::consts::PI
}

/// Splits an angle into its sign and a truncated count of `units` per degree.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn truncated_units(radians: f64, units_per_degree: f64) -> (bool, u64) {
    let degrees = radians_to_degrees(radians);
    let units = (degrees.abs() * units_per_degree + TRUNCATION_GUARD).floor() as u64;
    (degrees < 0.0 && units != 0, units)
}

/// Truncated units of an angle, held one unit under `limit` when the angle
/// is below it but the guard carried it up to the limit.
fn units_below(radians: f64, units_per_degree: f64, limit: Option<f64>) -> (bool, u64) {
    let (negative, units) = truncated_units(radians, units_per_degree);
    let Some(limit) = limit else {
        return (negative, units);
    };
    if radians >= limit {
        return (negative, units);
    }

    let signed = |(negative, units): (bool, u64)| {
        if negative { -i128::from(units) } else { i128::from(units) }
    };
    let value = signed((negative, units));
    let ceiling = signed(truncated_units(limit, units_per_degree));
    if value < ceiling {
        return (negative, units);
    }
    let clamped = ceiling - 1;
    (clamped < 0, u64::try_from(clamped.unsigned_abs()).unwrap_or(u64::MAX))
}

/// Formats an angle as degrees, minutes and seconds: `[-]D:MM:SS[.ss]`.
///
/// Hundredths of a second are written only when nonzero.
#[must_use]
pub fn format_dms(radians: f64) -> String {
    format_dms_below(radians, None)
}

/// Formats an angle like [`format_dms`], never reaching the exclusive
/// `limit` (in radians) when the angle lies below it.
#[must_use]
pub fn format_dms_below(radians: f64, limit: Option<f64>) -> String {
    let (negative, units) = units_below(radians, DMS_UNITS_PER_DEGREE, limit);
    let degrees = units / 360_000;
    let minutes = (units / 6_000) % 60;
    let seconds = (units / 100) % 60;
    let hundredths = units % 100;

    let sign = if negative { "-" } else { "" };
    if hundredths == 0 {
        format!("{sign}{degrees}:{minutes:02}:{seconds:02}")
    } else {
        format!("{sign}{degrees}:{minutes:02}:{seconds:02}.{hundredths:02}")
    }
}

/// Formats an angle as decimal degrees truncated to micro-degrees.
#[must_use]
pub fn format_decimal_degrees(radians: f64) -> String {
    format_decimal_degrees_below(radians, None)
}

/// Formats an angle like [`format_decimal_degrees`], never reaching the
/// exclusive `limit` (in radians) when the angle lies below it.
#[must_use]
pub fn format_decimal_degrees_below(radians: f64, limit: Option<f64>) -> String {
    let (negative, units) = units_below(radians, DECIMAL_UNITS_PER_DEGREE, limit);
    let whole = units / 1_000_000;
    let fraction = units % 1_000_000;

    let sign = if negative { "-" } else { "" };
    if fraction == 0 {
        return format!("{sign}{whole}");
    }
    let digits = format!("{fraction:06}");
    format!("{sign}{whole}.{}", digits.trim_end_matches('0'))
}

/// Parses an angle in degrees, returning radians.
///
/// Accepts `D:MM:SS[.fff]`, `D:MM`, and plain decimal degrees, each with an
/// optional leading sign.
///
/// # Errors
///
/// Returns a parse error if the text is not one of the accepted forms, or if
/// minutes or seconds are 60 or more.
pub fn parse_angle(text: &str) -> Result<f64> {
    let error = || Error::parse(format!("Could not parse angle \"{text}\"."));

    let trimmed = text.trim();
    let (negative, body) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let degrees = if body.contains(':') {
        let parts: Vec<&str> = body.split(':').collect();
        if parts.len() > 3 {
            return Err(error());
        }
        let whole = parse_digits(parts[0]).ok_or_else(error)?;
        let minutes = parse_digits(parts[1]).ok_or_else(error)?;
        if minutes >= 60.0 || parts[1].len() != 2 {
            return Err(error());
        }
        let seconds = match parts.get(2) {
            Some(part) => {
                let seconds = parse_seconds(part).ok_or_else(error)?;
                if seconds >= 60.0 {
                    return Err(error());
                }
                seconds
            }
            None => 0.0,
        };
        whole + minutes / 60.0 + seconds / 3600.0
    } else {
        if !is_plain_decimal(body) {
            return Err(error());
        }
        body.parse::<f64>().map_err(|_| error())?
    };

    if !degrees.is_finite() {
        return Err(error());
    }

    let degrees = if negative { -degrees } else { degrees };
    Ok(degrees_to_radians(degrees))
}

fn parse_digits(text: &str) -> Option<f64> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

fn parse_seconds(text: &str) -> Option<f64> {
    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (text, None),
    };
    if whole.len() != 2 || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if let Some(fraction) = fraction {
        if fraction.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
    }
    text.parse().ok()
}

/// Digits with at most one decimal point, and at least one digit.
fn is_plain_decimal(text: &str) -> bool {
    let mut digits = 0;
    let mut points = 0;
    for b in text.bytes() {
        match b {
            b'0'..=b'9' => digits += 1,
            b'.' => points += 1,
            _ => return false,
        }
    }
    digits > 0 && points <= 1
}
