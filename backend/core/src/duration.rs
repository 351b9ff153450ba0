//! Compact duration syntax shared by chat commands and the config file.
//!
//! A duration is an optional sign followed by one or more `<decimal><unit>`
//! groups, e.g. `5m`, `1h30m`, `1.5s`, `-5m`. Valid units are `ns`, `us`
//! (`µs`, `μs`), `ms`, `s`, `m` and `h`. A bare `0` is also accepted.

use std::time::Duration;

use thiserror::Error;

const NANOS_PER_MICRO: u64 = 1_000;
const NANOS_PER_MILLI: u64 = 1_000_000;
const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Longest fraction we keep exact; further digits cannot change the result.
const MAX_FRACTION_DIGITS: usize = 18;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationParseError {
    #[error("invalid duration {0:?}")]
    Invalid(String),

    #[error("missing unit in duration {0:?}")]
    MissingUnit(String),

    #[error("unknown unit {unit:?} in duration {input:?}")]
    UnknownUnit { unit: String, input: String },

    #[error("duration {0:?} is out of range")]
    Overflow(String),
}

/// A nanosecond-precision duration that may be negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SignedDuration {
    nanos: i64,
}

impl SignedDuration {
    pub const fn from_nanos(nanos: i64) -> Self {
        Self { nanos }
    }

    pub const fn as_nanos(&self) -> i64 {
        self.nanos
    }

    pub const fn is_negative(&self) -> bool {
        self.nanos < 0
    }

    /// Converts to a `std` duration; `None` when negative.
    pub fn to_std(&self) -> Option<Duration> {
        u64::try_from(self.nanos).ok().map(Duration::from_nanos)
    }
}

fn unit_nanos(unit: &str) -> Option<u64> {
    match unit {
        "ns" => Some(1),
        "us" | "\u{b5}s" | "\u{3bc}s" => Some(NANOS_PER_MICRO),
        "ms" => Some(NANOS_PER_MILLI),
        "s" => Some(NANOS_PER_SEC),
        "m" => Some(60 * NANOS_PER_SEC),
        "h" => Some(3600 * NANOS_PER_SEC),
        _ => None,
    }
}

/// Parse a duration such as `5m` or `-1h30m`.
pub fn parse_duration(input: &str) -> Result<SignedDuration, DurationParseError> {
    let invalid = || DurationParseError::Invalid(input.to_string());
    let overflow = || DurationParseError::Overflow(input.to_string());

    let mut s = input;
    let mut negative = false;
    if let Some(rest) = s.strip_prefix('-') {
        negative = true;
        s = rest;
    } else if let Some(rest) = s.strip_prefix('+') {
        s = rest;
    }
    if s == "0" {
        return Ok(SignedDuration::from_nanos(0));
    }
    if s.is_empty() {
        return Err(invalid());
    }

    let mut total: u64 = 0;
    while !s.is_empty() {
        let first = s.as_bytes()[0];
        if first != b'.' && !first.is_ascii_digit() {
            return Err(invalid());
        }

        let int_len = s.bytes().take_while(u8::is_ascii_digit).count();
        let (int_digits, rest) = s.split_at(int_len);
        s = rest;

        let mut frac_digits = "";
        if let Some(rest) = s.strip_prefix('.') {
            let frac_len = rest.bytes().take_while(u8::is_ascii_digit).count();
            (frac_digits, s) = rest.split_at(frac_len);
        }
        if int_digits.is_empty() && frac_digits.is_empty() {
            return Err(invalid());
        }

        let unit_len = s
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(s.len());
        if unit_len == 0 {
            return Err(DurationParseError::MissingUnit(input.to_string()));
        }
        let (unit, rest) = s.split_at(unit_len);
        s = rest;
        let scale = unit_nanos(unit).ok_or_else(|| DurationParseError::UnknownUnit {
            unit: unit.to_string(),
            input: input.to_string(),
        })?;

        let whole: u64 = if int_digits.is_empty() {
            0
        } else {
            int_digits.parse().map_err(|_| overflow())?
        };
        let mut value = whole.checked_mul(scale).ok_or_else(overflow)?;
        value = value
            .checked_add(fraction_nanos(frac_digits, scale))
            .ok_or_else(overflow)?;
        total = total.checked_add(value).ok_or_else(overflow)?;
    }

    let nanos = if negative {
        if total > i64::MAX as u64 + 1 {
            return Err(overflow());
        }
        (total as i64).wrapping_neg()
    } else {
        i64::try_from(total).map_err(|_| overflow())?
    };
    Ok(SignedDuration::from_nanos(nanos))
}

/// Nanoseconds contributed by the digits after the decimal point.
fn fraction_nanos(digits: &str, scale: u64) -> u64 {
    let digits = &digits[..digits.len().min(MAX_FRACTION_DIGITS)];
    if digits.is_empty() {
        return 0;
    }
    let numerator: u128 = digits.parse().unwrap_or(0);
    let denominator = 10u128.pow(digits.len() as u32);
    (numerator * scale as u128 / denominator) as u64
}

/// Render a duration in the same compact syntax, e.g. `5m0s` or `1.5s`.
pub fn format_duration(d: Duration) -> String {
    let nanos = d.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }
    if nanos < NANOS_PER_SEC as u128 {
        let (precision, unit) = if nanos < NANOS_PER_MICRO as u128 {
            return format!("{nanos}ns");
        } else if nanos < NANOS_PER_MILLI as u128 {
            (3, "\u{b5}s")
        } else {
            (6, "ms")
        };
        let (whole, frac) = split_fraction(nanos, precision);
        return format!("{whole}{frac}{unit}");
    }

    let (secs, frac) = split_fraction(nanos, 9);
    let mut out = String::new();
    let minutes = secs / 60;
    if minutes > 0 {
        let hours = minutes / 60;
        if hours > 0 {
            out.push_str(&format!("{hours}h"));
        }
        out.push_str(&format!("{}m", minutes % 60));
    }
    out.push_str(&format!("{}{frac}s", secs % 60));
    out
}

fn split_fraction(value: u128, precision: u32) -> (u128, String) {
    let unit = 10u128.pow(precision);
    let rem = value % unit;
    if rem == 0 {
        return (value / unit, String::new());
    }
    let digits = format!("{:0width$}", rem, width = precision as usize);
    (value / unit, format!(".{}", digits.trim_end_matches('0')))
}
