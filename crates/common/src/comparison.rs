use chrono::Duration;

use crate::models::{RunStatus, WorkflowRun};

/// Runs that can be compared: completed, with at least one output.
pub fn comparable_runs(runs: &[WorkflowRun]) -> Vec<&WorkflowRun> {
    runs.iter()
        .filter(|run| run.status == RunStatus::Completed && !run.output.is_empty())
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonMetrics {
    pub average_time: Duration,
    pub max_time: Duration,
    pub min_time: Duration,
    pub output_counts: Vec<(String, usize)>,
    pub total_outputs: usize,
}

/// Aggregates execution time and output counts over the selected runs.
///
/// Runs without both timestamps, or with a non-positive duration, do not
/// contribute to the timing figures. Returns `None` for an empty selection.
pub fn compare(selected: &[&WorkflowRun]) -> Option<ComparisonMetrics> {
    if selected.is_empty() {
        return None;
    }

    let times: Vec<Duration> = selected
        .iter()
        .filter_map(|run| Some(run.ended_at()? - run.started_at()?))
        .filter(|elapsed| *elapsed > Duration::zero())
        .collect();

    let (average_time, max_time, min_time) = if times.is_empty() {
        (Duration::zero(), Duration::zero(), Duration::zero())
    } else {
        let total_ms: i64 = times.iter().map(Duration::num_milliseconds).sum();
        (
            Duration::milliseconds(total_ms / times.len() as i64),
            times.iter().copied().max().unwrap_or_else(Duration::zero),
            times.iter().copied().min().unwrap_or_else(Duration::zero),
        )
    };

    let output_counts: Vec<(String, usize)> = selected
        .iter()
        .map(|run| (run.id.clone(), run.output.len()))
        .collect();
    let total_outputs = output_counts.iter().map(|(_, count)| count).sum();

    Some(ComparisonMetrics {
        average_time,
        max_time,
        min_time,
        output_counts,
        total_outputs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(id: &str, status: &str, start: &str, end: Option<&str>, outputs: usize) -> WorkflowRun {
        let output: Vec<_> = (0..outputs)
            .map(|i| json!({"name": format!("out{i}.tif"), "mime_type": "image/tiff", "type": "raster", "url": ""}))
            .collect();
        serde_json::from_value(json!({
            "id": id,
            "workflow": "w",
            "name": id,
            "start_time": start,
            "end_time": end,
            "status": status,
            "output": output
        }))
        .unwrap()
    }

    #[test]
    fn test_only_completed_runs_with_outputs_are_comparable() {
        let runs = vec![
            run("a", "completed", "2024-01-01T00:00:00Z", Some("2024-01-01T00:01:00Z"), 1),
            run("b", "completed", "2024-01-01T00:00:00Z", Some("2024-01-01T00:01:00Z"), 0),
            run("c", "failed", "2024-01-01T00:00:00Z", Some("2024-01-01T00:01:00Z"), 2),
        ];
        let ids: Vec<&str> = comparable_runs(&runs).iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a"]);
    }

    #[test]
    fn test_compare_aggregates() {
        let runs = [
            run("a", "completed", "2024-01-01T00:00:00Z", Some("2024-01-01T00:01:00Z"), 1),
            run("b", "completed", "2024-01-01T00:00:00Z", Some("2024-01-01T00:03:00Z"), 3),
            run("c", "completed", "2024-01-01T00:00:00Z", None, 2),
        ];
        let selected: Vec<&WorkflowRun> = runs.iter().collect();
        let metrics = compare(&selected).unwrap();

        assert_eq!(metrics.average_time, Duration::minutes(2));
        assert_eq!(metrics.max_time, Duration::minutes(3));
        assert_eq!(metrics.min_time, Duration::minutes(1));
        assert_eq!(metrics.total_outputs, 6);
        assert_eq!(metrics.output_counts[2], ("c".to_string(), 2));
    }

    #[test]
    fn test_compare_empty_selection() {
        assert!(compare(&[]).is_none());
    }
}
