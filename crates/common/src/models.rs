use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::visualization::Visualization;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WorkflowInput {
    pub name: String,
    #[serde(rename = "type")]
    pub input_type: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WorkflowOutput {
    pub name: String,
    #[serde(rename = "type")]
    pub output_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Workflow {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub inputs: Vec<WorkflowInput>,
    #[serde(default)]
    pub outputs: Vec<WorkflowOutput>,
}

impl Workflow {
    pub fn input(&self, name: &str) -> Option<&WorkflowInput> {
        self.inputs.iter().find(|input| input.name == name)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Submitted,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Submitted => "submitted",
            RunStatus::Running => "running",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
            RunStatus::Cancelled => "cancelled",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            RunStatus::Submitted => "📋",
            RunStatus::Running => "⏳",
            RunStatus::Completed => "✅",
            RunStatus::Failed => "❌",
            RunStatus::Cancelled => "🛑",
        }
    }

    /// A terminal run never changes status again, so there is nothing left to poll for.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunStatus::Completed | RunStatus::Failed | RunStatus::Cancelled
        )
    }

    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RunOutput {
    pub name: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(rename = "type", default)]
    pub output_type: String,
    #[serde(default)]
    pub url: String,
    /// Raw visualization payload as sent by the server. Use
    /// [`RunOutput::parsed_visualization`] to get the typed form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visualization: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<Value>,
}

impl RunOutput {
    /// Parses the server-supplied visualization, if any.
    ///
    /// `Ok(None)` means the server sent nothing; an `Err` means the payload's
    /// `type` tag did not match its shape.
    pub fn parsed_visualization(&self) -> Result<Option<Visualization>, serde_json::Error> {
        match &self.visualization {
            None | Some(Value::Null) => Ok(None),
            Some(raw) => Visualization::deserialize(raw).map(Some),
        }
    }

    /// The bare `type` tag of the visualization payload, whatever its shape.
    pub fn visualization_tag(&self) -> Option<&str> {
        self.visualization.as_ref()?.get("type")?.as_str()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WorkflowRun {
    pub id: String,
    pub workflow: String,
    pub name: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    pub status: RunStatus,
    #[serde(default)]
    pub output: Vec<RunOutput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl WorkflowRun {
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.start_time)
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.end_time.as_deref().and_then(parse_timestamp)
    }

    pub fn can_cancel(&self) -> bool {
        self.status == RunStatus::Running
    }

    pub fn can_delete(&self) -> bool {
        self.status != RunStatus::Running
    }

    pub fn can_view_results(&self) -> bool {
        self.status == RunStatus::Completed
    }
}

/// Parses the service's timestamps: RFC 3339, or naive ISO-8601 taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryType {
    FeatureCollection,
    Feature,
    Polygon,
    MultiPolygon,
    Point,
    LineString,
}

impl GeometryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeometryType::FeatureCollection => "FeatureCollection",
            GeometryType::Feature => "Feature",
            GeometryType::Polygon => "Polygon",
            GeometryType::MultiPolygon => "MultiPolygon",
            GeometryType::Point => "Point",
            GeometryType::LineString => "LineString",
        }
    }
}

/// A GeoJSON object. Only the `type` member is interpreted; everything else
/// is forwarded to the service untouched.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GeoJson {
    #[serde(rename = "type")]
    pub geometry_type: GeometryType,
    #[serde(flatten)]
    pub members: Map<String, Value>,
}

impl GeoJson {
    /// Number of features for a collection, 1 for anything else.
    pub fn feature_count(&self) -> usize {
        match self.geometry_type {
            GeometryType::FeatureCollection => self
                .members
                .get("features")
                .and_then(Value::as_array)
                .map_or(0, Vec::len),
            _ => 1,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TimeRange {
    pub start: String,
    pub end: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RunSubmission {
    pub workflow: String,
    pub name: String,
    pub geometry: GeoJson,
    pub time_range: TimeRange,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Map<String, Value>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SystemMetrics {
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub disk_percent: f64,
    #[serde(default)]
    pub available_memory_gb: f64,
    #[serde(default)]
    pub total_memory_gb: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub skip: u64,
    pub take: u64,
}
