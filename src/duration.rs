//! Poll-interval parsing for the `--interval` flag.

use std::time::Duration;

use anyhow::{bail, Result};

/// Parse interval strings like "670ms" or "2s".
///
/// Check "ms" before "s": every millisecond value also ends in "s".
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();

    let (value, divisor) = if let Some(val) = s.strip_suffix("ms") {
        (val, 1000.0)
    } else if let Some(val) = s.strip_suffix('s') {
        (val, 1.0)
    } else {
        bail!("unknown interval format: {s} (use e.g. \"670ms\" or \"2s\")");
    };

    let value: f64 = value.parse()?;
    if value < 0.0 {
        bail!("interval must not be negative: {s}");
    }

    Ok(Duration::from_secs_f64(value / divisor))
}
