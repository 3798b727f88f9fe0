//! Decides which renderer an output gets when the server does not say.
//!
//! The rules are evaluated top to bottom and the first match wins, so the
//! order of [`RULES`] is part of the behaviour.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::RunOutput;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    TimeSeries,
    Categorical,
    Continuous,
    Generic,
}

impl OutputKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputKind::TimeSeries => "timeseries",
            OutputKind::Categorical => "categorical",
            OutputKind::Continuous => "continuous",
            OutputKind::Generic => "generic",
        }
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classification rule over the lowercased output name and MIME type.
pub struct Rule {
    pub kind: OutputKind,
    pub matches: fn(name: &str, mime: &str) -> bool,
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

fn is_time_series(name: &str, mime: &str) -> bool {
    contains_any(name, &["time", "series", "ndvi", "trend"])
        || (mime.contains("json") && contains_any(name, &["harvest", "carbon", "yield", "growth"]))
}

fn is_categorical(name: &str, _mime: &str) -> bool {
    contains_any(name, &["class", "segment", "detection"])
        || (name.contains("map") && contains_any(name, &["crop", "practice", "weed", "land"]))
}

fn is_continuous(name: &str, mime: &str) -> bool {
    contains_any(name, &["temp", "heat", "precipit", "soil", "moisture"])
        || contains_any(mime, &["tiff", "geotiff"])
}

fn is_tabular(_name: &str, mime: &str) -> bool {
    mime.contains("csv")
}

pub const RULES: [Rule; 4] = [
    Rule {
        kind: OutputKind::TimeSeries,
        matches: is_time_series,
    },
    Rule {
        kind: OutputKind::Categorical,
        matches: is_categorical,
    },
    Rule {
        kind: OutputKind::Continuous,
        matches: is_continuous,
    },
    Rule {
        kind: OutputKind::TimeSeries,
        matches: is_tabular,
    },
];

/// Classifies an output by name and MIME type, ignoring case.
pub fn classify(name: &str, mime_type: &str) -> OutputKind {
    let name = name.to_lowercase();
    let mime = mime_type.to_lowercase();
    RULES
        .iter()
        .find(|rule| (rule.matches)(&name, &mime))
        .map_or(OutputKind::Generic, |rule| rule.kind)
}

/// Rendering strategy for a server visualization tag, if it is a known one.
pub fn kind_for_tag(tag: &str) -> Option<OutputKind> {
    match tag.to_lowercase().as_str() {
        "timeseries" => Some(OutputKind::TimeSeries),
        "categorical" => Some(OutputKind::Categorical),
        "continuous" | "multispectral" => Some(OutputKind::Continuous),
        _ => None,
    }
}

/// Rendering strategy for an output. A known server visualization type wins
/// even when the rest of its payload is malformed; the name/MIME heuristic
/// only applies when there is no usable type tag.
pub fn resolve_kind(output: &RunOutput) -> OutputKind {
    match output.parsed_visualization() {
        Ok(Some(viz)) => viz.kind(),
        _ => output
            .visualization_tag()
            .and_then(kind_for_tag)
            .unwrap_or_else(|| classify(&output.name, &output.mime_type)),
    }
}

/// Short label for outputs shown as a plain download.
pub fn output_icon(output_type: &str, mime_type: &str) -> &'static str {
    let output_type = output_type.to_lowercase();
    let mime = mime_type.to_lowercase();
    if output_type.contains("raster") || mime.contains("tiff") {
        "raster"
    } else if output_type.contains("vector") || mime.contains("geojson") {
        "vector"
    } else if output_type.contains("csv") || mime.contains("csv") {
        "table"
    } else if output_type.contains("json") || mime.contains("json") {
        "document"
    } else if output_type.contains("text") || mime.contains("text") {
        "text"
    } else if output_type.contains("image") || mime.contains("image") {
        "image"
    } else {
        "file"
    }
}
