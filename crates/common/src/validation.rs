use chrono::{Duration, NaiveDate};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::{GeoJson, RunSubmission, TimeRange};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Please fill in all required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("Invalid GeoJSON: {0}")]
    InvalidGeometry(String),
    #[error("Parameter '{0}' is required")]
    MissingParameter(String),
    #[error("Unknown parameter '{0}'")]
    UnknownParameter(String),
    #[error("Invalid value for parameter '{name}' (expected {expected}): {reason}")]
    InvalidParameter {
        name: String,
        expected: String,
        reason: String,
    },
    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),
}

/// Parses pasted or uploaded GeoJSON text.
pub fn parse_geojson(text: &str) -> Result<GeoJson, ValidationError> {
    serde_json::from_str(text).map_err(|e| ValidationError::InvalidGeometry(e.to_string()))
}

/// Start and end dates as typed. The range only counts once both are present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateRangeDraft {
    pub start: Option<String>,
    pub end: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl DateRangeDraft {
    pub fn new(start: Option<String>, end: Option<String>) -> Self {
        Self { start, end }
    }

    /// The last `days` days ending on `today`, as `YYYY-MM-DD` bounds.
    pub fn last_days(days: u32, today: NaiveDate) -> Result<Self, ValidationError> {
        let start = today
            .checked_sub_signed(Duration::days(i64::from(days)))
            .ok_or_else(|| {
                ValidationError::InvalidDateRange(format!("{days} days before {today} is out of range"))
            })?;
        Ok(Self {
            start: Some(start.format("%Y-%m-%d").to_string()),
            end: Some(today.format("%Y-%m-%d").to_string()),
        })
    }

    pub fn range(&self) -> Option<TimeRange> {
        let start = non_blank(&self.start)?;
        let end = non_blank(&self.end)?;
        Some(TimeRange {
            start: start.to_string(),
            end: end.to_string(),
        })
    }

    pub fn is_set(&self) -> bool {
        self.range().is_some()
    }
}

/// Everything collected for a run before it is submitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionDraft {
    pub workflow: Option<String>,
    pub name: String,
    pub geometry: Option<GeoJson>,
    pub time_range: DateRangeDraft,
    pub parameters: Map<String, Value>,
}

impl SubmissionDraft {
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if non_blank(&self.workflow).is_none() {
            missing.push("workflow");
        }
        if self.name.trim().is_empty() {
            missing.push("run name");
        }
        if self.geometry.is_none() {
            missing.push("geometry");
        }
        if !self.time_range.is_set() {
            missing.push("time range");
        }
        missing
    }

    /// Builds the request body, or reports every missing required field.
    pub fn validate(&self) -> Result<RunSubmission, ValidationError> {
        let missing = self.missing_fields();
        let (Some(workflow), Some(geometry), Some(time_range), true) = (
            non_blank(&self.workflow),
            self.geometry.as_ref(),
            self.time_range.range(),
            missing.is_empty(),
        ) else {
            return Err(ValidationError::MissingFields(missing));
        };

        Ok(RunSubmission {
            workflow: workflow.to_string(),
            name: self.name.trim().to_string(),
            geometry: geometry.clone(),
            time_range,
            parameters: if self.parameters.is_empty() {
                None
            } else {
                Some(self.parameters.clone())
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point() -> GeoJson {
        parse_geojson(r#"{"type": "Point", "coordinates": [-122.1, 47.6]}"#).unwrap()
    }

    fn complete_draft() -> SubmissionDraft {
        SubmissionDraft {
            workflow: Some("farm_ai/agriculture/ndvi_summary".into()),
            name: "north field".into(),
            geometry: Some(point()),
            time_range: DateRangeDraft::new(Some("2024-01-01".into()), Some("2024-06-30".into())),
            parameters: Map::new(),
        }
    }

    #[test]
    fn test_complete_draft_validates() {
        let submission = complete_draft().validate().unwrap();
        assert_eq!(submission.workflow, "farm_ai/agriculture/ndvi_summary");
        assert_eq!(submission.time_range.start, "2024-01-01");
        assert!(submission.parameters.is_none());
    }

    #[test]
    fn test_each_missing_field_is_reported() {
        let cases: Vec<(SubmissionDraft, &str)> = vec![
            (
                SubmissionDraft {
                    workflow: None,
                    ..complete_draft()
                },
                "workflow",
            ),
            (
                SubmissionDraft {
                    name: "   ".into(),
                    ..complete_draft()
                },
                "run name",
            ),
            (
                SubmissionDraft {
                    geometry: None,
                    ..complete_draft()
                },
                "geometry",
            ),
            (
                SubmissionDraft {
                    time_range: DateRangeDraft::new(Some("2024-01-01".into()), None),
                    ..complete_draft()
                },
                "time range",
            ),
        ];
        for (draft, field) in cases {
            assert_eq!(
                draft.validate(),
                Err(ValidationError::MissingFields(vec![field]))
            );
        }
    }

    #[test]
    fn test_empty_draft_lists_everything() {
        let err = SubmissionDraft::default().validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Please fill in all required fields: workflow, run name, geometry, time range"
        );
    }

    #[test]
    fn test_range_requires_both_bounds() {
        assert!(!DateRangeDraft::new(None, Some("2024-01-01".into())).is_set());
        assert!(!DateRangeDraft::new(Some("".into()), Some("2024-01-01".into())).is_set());
        assert!(DateRangeDraft::new(Some("2023-01-01".into()), Some("2024-01-01".into())).is_set());
    }

    #[test]
    fn test_last_days() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let range = DateRangeDraft::last_days(30, today).unwrap().range().unwrap();
        assert_eq!(range.start, "2024-03-01");
        assert_eq!(range.end, "2024-03-31");
    }

    #[test]
    fn test_last_days_out_of_calendar_range_is_an_error() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        assert!(matches!(
            DateRangeDraft::last_days(u32::MAX, today),
            Err(ValidationError::InvalidDateRange(_))
        ));
        assert!(DateRangeDraft::last_days(0, today).unwrap().is_set());
    }

    #[test]
    fn test_parse_geojson_rejects_garbage() {
        assert!(matches!(
            parse_geojson("{not json"),
            Err(ValidationError::InvalidGeometry(_))
        ));
        assert!(matches!(
            parse_geojson(r#"{"type": "Circle", "radius": 3}"#),
            Err(ValidationError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn test_parameters_are_forwarded_when_present() {
        let mut draft = complete_draft();
        draft
            .parameters
            .insert("cloud_cover".into(), Value::from(20));
        let submission = draft.validate().unwrap();
        assert_eq!(
            submission.parameters.unwrap().get("cloud_cover"),
            Some(&Value::from(20))
        );
    }
}
