use chrono::{DateTime, Utc};

use crate::models::parse_timestamp;

/// Human duration between two service timestamps; an open run is measured to `now`.
pub fn format_duration(start: &str, end: Option<&str>, now: DateTime<Utc>) -> String {
    let Some(start) = parse_timestamp(start) else {
        return "-".to_string();
    };
    let end = end.and_then(parse_timestamp).unwrap_or(now);
    format_elapsed_secs((end - start).num_seconds())
}

pub fn format_elapsed_secs(secs: i64) -> String {
    let secs = secs.max(0);
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}

pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let exponent = ((bytes as f64).ln() / 1024f64.ln()).floor() as usize;
    let exponent = exponent.min(UNITS.len() - 1);
    let scaled = bytes as f64 / 1024f64.powi(exponent as i32);
    let rounded = (scaled * 100.0).round() / 100.0;
    format!("{rounded} {}", UNITS[exponent])
}

pub fn format_percent(value: f64, decimals: usize) -> String {
    format!("{value:.decimals$}%")
}

/// Load band used to colour utilization gauges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageLevel {
    Normal,
    Elevated,
    Critical,
}

impl UsageLevel {
    pub fn for_percent(value: f64) -> Self {
        if value > 80.0 {
            UsageLevel::Critical
        } else if value > 50.0 {
            UsageLevel::Elevated
        } else {
            UsageLevel::Normal
        }
    }
}

/// A fixed-width text gauge, e.g. `[#####-----]`.
pub fn usage_bar(value: f64, width: usize) -> String {
    let filled = ((value.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}
