use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColormapName {
    #[default]
    Viridis,
    Plasma,
    Magma,
    Cool,
    Warm,
    /// The payload carries its own stops in `customColormap`.
    Custom,
}

const VIRIDIS: [&str; 10] = [
    "#440154", "#482878", "#3e4989", "#31688e", "#26828e", "#1f9e89", "#35b779", "#6ece58",
    "#b5de2b", "#fde724",
];
const PLASMA: [&str; 10] = [
    "#0d0887", "#46039f", "#7201a8", "#9c179e", "#bd3786", "#d8576b", "#ed7953", "#fb9f3a",
    "#fdca26", "#f0f921",
];
const MAGMA: [&str; 10] = [
    "#000004", "#1c1044", "#4f127b", "#812581", "#b5367a", "#e55064", "#fb8761", "#fec287",
    "#fbfdbf", "#fcfdbf",
];
const COOL: [&str; 10] = [
    "#00008F", "#0020FF", "#0040FF", "#0080FF", "#00BFFF", "#00FFFF", "#40FFFF", "#80FFFF",
    "#BFFFFF", "#FFFFFF",
];
const WARM: [&str; 10] = [
    "#FFFFFF", "#FFFF00", "#FFCC00", "#FF9900", "#FF6600", "#FF3300", "#CC0000", "#990000",
    "#660000", "#330000",
];

impl ColormapName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColormapName::Viridis => "viridis",
            ColormapName::Plasma => "plasma",
            ColormapName::Magma => "magma",
            ColormapName::Cool => "cool",
            ColormapName::Warm => "warm",
            ColormapName::Custom => "custom",
        }
    }

    /// Stops of a built-in colormap. `Custom` falls back to viridis.
    pub fn stops(&self) -> &'static [&'static str] {
        match self {
            ColormapName::Viridis | ColormapName::Custom => &VIRIDIS,
            ColormapName::Plasma => &PLASMA,
            ColormapName::Magma => &MAGMA,
            ColormapName::Cool => &COOL,
            ColormapName::Warm => &WARM,
        }
    }
}

/// Picks the stop for a value normalized to `0..=1`; out-of-range values are clamped.
pub fn color_for_normalized<'a>(value: f64, stops: &[&'a str]) -> Option<&'a str> {
    if stops.is_empty() {
        return None;
    }
    let clamped = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
    let index = (clamped * (stops.len() - 1) as f64).floor() as usize;
    stops.get(index).copied()
}

/// Picks the stop for `value` within `[min, max]`. A degenerate range maps to the first stop.
pub fn color_for_value<'a>(value: f64, min: f64, max: f64, stops: &[&'a str]) -> Option<&'a str> {
    let span = max - min;
    let normalized = if span.abs() < f64::EPSILON {
        0.0
    } else {
        (value - min) / span
    };
    color_for_normalized(normalized, stops)
}

pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
    let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
    let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
    Some((r, g, b))
}

pub fn rgb_to_hex(r: u8, g: u8, b: u8) -> String {
    format!("#{r:02x}{g:02x}{b:02x}")
}

/// Linear blend of two hex colours; returns `from` unchanged if either fails to parse.
pub fn interpolate_color(from: &str, to: &str, t: f64) -> String {
    let (Some(c1), Some(c2)) = (hex_to_rgb(from), hex_to_rgb(to)) else {
        return from.to_string();
    };
    let t = t.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    rgb_to_hex(mix(c1.0, c2.0), mix(c1.1, c2.1), mix(c1.2, c2.2))
}

/// Resamples `stops` into `steps` evenly spaced colours.
pub fn interpolate_colormap(stops: &[&str], steps: usize) -> Vec<String> {
    if stops.len() < 2 || stops.len() == steps || steps < 2 {
        return stops.iter().map(|s| s.to_string()).collect();
    }
    let per_segment = (steps - 1) as f64 / (stops.len() - 1) as f64;
    (0..steps)
        .map(|i| {
            let segment = i as f64 / per_segment;
            let lower = segment.floor() as usize;
            let upper = (segment.ceil() as usize).min(stops.len() - 1);
            if lower == upper {
                stops[lower].to_string()
            } else {
                interpolate_color(stops[lower], stops[upper], segment - lower as f64)
            }
        })
        .collect()
}
