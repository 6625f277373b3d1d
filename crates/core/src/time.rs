//! Time and date display helpers.

use chrono::{DateTime, NaiveDateTime};

/// Render a duration in seconds as `2h 30m 45s`. Zero or negative input is `0s`.
pub fn seconds_to_human_readable(seconds: f64) -> String {
    if seconds.is_nan() || seconds <= 0.0 {
        return "0s".into();
    }

    let total = seconds.floor() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let remaining = total % 60;

    let mut parts = Vec::new();
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 {
        parts.push(format!("{minutes}m"));
    }
    if remaining > 0 || parts.is_empty() {
        parts.push(format!("{remaining}s"));
    }
    parts.join(" ")
}

/// Display form of a record timestamp: `N/A` when missing, the raw text when unparseable.
pub fn format_date(value: Option<&str>) -> String {
    let Some(raw) = value.filter(|v| !v.trim().is_empty()) else {
        return "N/A".into();
    };

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.format("%Y-%m-%d %H:%M:%S").to_string();
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return parsed.format("%Y-%m-%d %H:%M:%S").to_string();
    }
    raw.to_string()
}
