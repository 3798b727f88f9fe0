//! Server-supplied visualization payloads.
//!
//! The `type` member selects the variant and the remaining members must
//! match it, so the payload is modelled as a closed, internally tagged enum.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::classifier::OutputKind;
use crate::colormap::ColormapName;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Visualization {
    TimeSeries(TimeSeriesVisualization),
    Categorical(CategoricalVisualization),
    Continuous(ContinuousVisualization),
    Multispectral(MultispectralVisualization),
}

impl Visualization {
    pub fn meta(&self) -> &VisualizationMeta {
        match self {
            Visualization::TimeSeries(v) => &v.meta,
            Visualization::Categorical(v) => &v.meta,
            Visualization::Continuous(v) => &v.meta,
            Visualization::Multispectral(v) => &v.meta,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Visualization::TimeSeries(_) => "timeseries",
            Visualization::Categorical(_) => "categorical",
            Visualization::Continuous(_) => "continuous",
            Visualization::Multispectral(_) => "multispectral",
        }
    }

    /// Rendering strategy for this payload. Multispectral bands go through the
    /// raster viewer, the same as continuous data.
    pub fn kind(&self) -> OutputKind {
        match self {
            Visualization::TimeSeries(_) => OutputKind::TimeSeries,
            Visualization::Categorical(_) => OutputKind::Categorical,
            Visualization::Continuous(_) | Visualization::Multispectral(_) => {
                OutputKind::Continuous
            }
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

/// Members shared by every visualization variant.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct VisualizationMeta {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TimeSeriesPoint {
    /// Either an ISO date or a bare year/number, depending on the workflow.
    pub date: Value,
    #[serde(flatten)]
    pub values: BTreeMap<String, Value>,
}

impl TimeSeriesPoint {
    pub fn value(&self, key: &str) -> Option<f64> {
        self.values.get(key).and_then(Value::as_f64)
    }

    pub fn date_label(&self) -> String {
        match &self.date {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SeriesDefinition {
    pub key: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TimeSeriesVisualization {
    #[serde(flatten)]
    pub meta: VisualizationMeta,
    #[serde(default)]
    pub data: Vec<TimeSeriesPoint>,
    #[serde(default)]
    pub series: Vec<SeriesDefinition>,
    #[serde(rename = "xAxisLabel", default, skip_serializing_if = "Option::is_none")]
    pub x_axis_label: Option<String>,
    #[serde(rename = "yAxisLabel", default, skip_serializing_if = "Option::is_none")]
    pub y_axis_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSummary {
    pub points: usize,
    pub min: f64,
    pub max: f64,
    pub first: f64,
    pub last: f64,
}

impl TimeSeriesVisualization {
    /// Summary of the numeric values recorded under `key`, or `None` if no
    /// point carries a number for it.
    pub fn summarize(&self, key: &str) -> Option<SeriesSummary> {
        let values: Vec<f64> = self.data.iter().filter_map(|p| p.value(key)).collect();
        let first = *values.first()?;
        let last = *values.last()?;
        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(*v), hi.max(*v))
            });
        Some(SeriesSummary {
            points: values.len(),
            min,
            max,
            first,
            last,
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CategoricalClass {
    pub value: i64,
    pub label: String,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CategoricalStatistics {
    pub total_pixels: u64,
    /// Pixel count per class value. JSON object keys are strings, so the
    /// class value is kept in its string form.
    #[serde(default)]
    pub class_distribution: BTreeMap<String, u64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CategoricalVisualization {
    #[serde(flatten)]
    pub meta: VisualizationMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colormap: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub classes: Vec<CategoricalClass>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics: Option<CategoricalStatistics>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassShare {
    pub value: i64,
    pub label: String,
    pub color: String,
    pub pixel_count: u64,
    pub percentage: f64,
}

impl CategoricalVisualization {
    /// Per-class pixel counts and percentages, largest class first.
    ///
    /// Without statistics every class reports zero and the declared order is kept.
    pub fn class_shares(&self) -> Vec<ClassShare> {
        let mut shares: Vec<ClassShare> = match &self.statistics {
            None => self
                .classes
                .iter()
                .map(|cls| ClassShare {
                    value: cls.value,
                    label: cls.label.clone(),
                    color: cls.color.clone(),
                    pixel_count: 0,
                    percentage: 0.0,
                })
                .collect(),
            Some(stats) => {
                let total = stats.total_pixels.max(1) as f64;
                self.classes
                    .iter()
                    .map(|cls| {
                        let pixel_count = stats
                            .class_distribution
                            .get(&cls.value.to_string())
                            .copied()
                            .unwrap_or(0);
                        ClassShare {
                            value: cls.value,
                            label: cls.label.clone(),
                            color: cls.color.clone(),
                            pixel_count,
                            percentage: pixel_count as f64 / total * 100.0,
                        }
                    })
                    .collect()
            }
        };
        shares.sort_by(|a, b| b.pixel_count.cmp(&a.pixel_count));
        shares
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ContinuousStatistics {
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ContinuousVisualization {
    #[serde(flatten)]
    pub meta: VisualizationMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    pub min: f64,
    pub max: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colormap: Option<ColormapName>,
    #[serde(rename = "customColormap", default, skip_serializing_if = "Option::is_none")]
    pub custom_colormap: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics: Option<ContinuousStatistics>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RasterBand {
    pub name: String,
    #[serde(default)]
    pub data: Vec<Vec<f64>>,
    pub min: f64,
    pub max: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodata: Option<f64>,
}

impl RasterBand {
    pub fn dimensions(&self) -> (usize, usize) {
        let rows = self.data.len();
        let cols = self.data.first().map_or(0, Vec::len);
        (rows, cols)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RgbComposite {
    pub red: usize,
    pub green: usize,
    pub blue: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MultispectralVisualization {
    #[serde(flatten)]
    pub meta: VisualizationMeta,
    #[serde(default)]
    pub bands: Vec<RasterBand>,
    #[serde(rename = "defaultComposite", default, skip_serializing_if = "Option::is_none")]
    pub default_composite: Option<RgbComposite>,
}
