use crate::error::RuntimeError;
use std::time::Duration;

/// Result of a `schedule(interval)` call, spec §4.E.1/§4.E.3. `Once`
/// (or omitting the call entirely) ends the Run after the current tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    Once,
    After(Duration),
}

/// Parses the `{30s, 5m, 1h, 1d, once}` forms from spec §4.E.1.
///
/// The source silently defaults unrecognized forms to one minute (spec
/// §9 open question); this implementation takes the stricter path the
/// spec recommends and refuses instead, surfacing a parameter-class
/// error at both load time (§4.E.2) and tick time (§4.E.3).
pub fn parse_interval(raw: &str) -> Result<Schedule, RuntimeError> {
    if raw == "once" {
        return Ok(Schedule::Once);
    }

    let invalid = || RuntimeError::InvalidParameter {
        name: "interval".to_string(),
        reason: format!("'{raw}' does not match {{N}}s|{{N}}m|{{N}}h|{{N}}d|once"),
    };

    if raw.is_empty() {
        return Err(invalid());
    }
    let (digits, unit) = raw.split_at(raw.len() - 1);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let count: u64 = digits.parse().map_err(|_| invalid())?;

    let seconds = match unit {
        "s" => count,
        "m" => count * 60,
        "h" => count * 3600,
        "d" => count * 86_400,
        _ => return Err(invalid()),
    };

    Ok(Schedule::After(Duration::from_secs(seconds)))
}
