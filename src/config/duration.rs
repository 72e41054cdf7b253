//! Time period parsing for options such as "Max Bin Age".
//!
//! Values are humantime spans, with the unit optionally separated by a space: `"1 sec"`,
//! `"500ms"`, `"5 min"`, `"1m 30s"`. A bare number is read as milliseconds.

use crate::error::ConfigError;
use std::time::Duration;

pub fn parse_duration(value: &str) -> Result<Duration, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidDuration {
        value: value.to_string(),
        reason,
    };

    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(invalid("empty value".to_string()));
    }
    if trimmed.bytes().all(|b| b.is_ascii_digit()) {
        let millis: u64 = trimmed
            .parse()
            .map_err(|_| invalid("number out of range".to_string()))?;
        return Ok(Duration::from_millis(millis));
    }
    humantime::parse_duration(&join_units(trimmed)).map_err(|e| invalid(e.to_string()))
}

/// Drop whitespace between a number and its unit, so `"1 sec"` reads as `"1sec"`.
fn join_units(value: &str) -> String {
    let mut joined = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        if c.is_whitespace() && joined.ends_with(|p: char| p.is_ascii_digit()) {
            while chars.next_if(|n| n.is_whitespace()).is_some() {}
            if chars.peek().map_or(false, |n| n.is_alphabetic()) {
                continue;
            }
        }
        joined.push(c);
    }
    joined
}
