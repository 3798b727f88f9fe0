use chrono::{DateTime, Utc};
use farmvibes_common::formatting::format_duration;
use farmvibes_common::{Paginated, WorkflowRun};

use super::outputs::render_output;
use super::{short_id, truncate};

pub fn render_run_table(page: &Paginated<WorkflowRun>, now: DateTime<Utc>) -> String {
    if page.items.is_empty() {
        return "No runs yet. Submit one with `farmvibes-dashboard submit`.".to_string();
    }

    let mut lines = vec![format!(
        "{:<8}  {:<24}  {:<28}  {:<13}  {:<8}  {}",
        "ID", "NAME", "WORKFLOW", "STATUS", "DURATION", "OUTPUTS"
    )];
    for run in &page.items {
        lines.push(format!(
            "{:<8}  {:<24}  {:<28}  {} {:<11}  {:<8}  {}",
            short_id(&run.id),
            truncate(&run.name, 24),
            truncate(&run.workflow, 28),
            run.status.icon(),
            run.status.as_str(),
            format_duration(&run.start_time, run.end_time.as_deref(), now),
            run.output.len()
        ));
    }

    let first = page.skip + 1;
    let last = page.skip + page.items.len() as u64;
    lines.push(format!("Showing {first}-{last} of {}", page.total));
    lines.join("\n")
}

pub fn render_run_detail(run: &WorkflowRun, now: DateTime<Utc>) -> String {
    let mut lines = vec![
        format!("{} {}", run.status.icon(), run.name),
        format!("ID:       {}", run.id),
        format!("Workflow: {}", run.workflow),
        format!("Status:   {}", run.status),
        format!("Started:  {}", if run.start_time.is_empty() { "-" } else { run.start_time.as_str() }),
    ];
    if let Some(end) = &run.end_time {
        lines.push(format!("Ended:    {end}"));
    }
    lines.push(format!(
        "Duration: {}",
        format_duration(&run.start_time, run.end_time.as_deref(), now)
    ));
    if let Some(description) = &run.description {
        lines.push(format!("Details:  {description}"));
    }

    if let Some(parameters) = run.parameters.as_ref().filter(|p| !p.is_empty()) {
        lines.push("Parameters:".to_string());
        for (key, value) in parameters {
            lines.push(format!("  {key} = {value}"));
        }
    }

    let mut actions = Vec::new();
    if run.can_cancel() {
        actions.push("cancel");
    }
    if run.can_delete() {
        actions.push("delete");
    }
    actions.push("resubmit");
    lines.push(format!("Actions:  {}", actions.join(", ")));

    if run.can_view_results() {
        lines.push(String::new());
        if run.output.is_empty() {
            lines.push("No outputs.".to_string());
        } else {
            lines.push(format!("Outputs ({}):", run.output.len()));
            for output in &run.output {
                lines.push(String::new());
                lines.push(render_output(output));
            }
        }
    } else if run.status.is_active() {
        lines.push("Results will be available once the run completes.".to_string());
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use farmvibes_common::models::parse_timestamp;
    use serde_json::json;

    fn run(status: &str, outputs: serde_json::Value) -> WorkflowRun {
        let end_time = match status {
            "running" => json!(null),
            _ => json!("2024-03-01T10:05:30Z"),
        };
        serde_json::from_value(json!({
            "id": "0f4b2c1e-9f0a-4c55-8d1e-1234567890ab",
            "workflow": "harvest_period",
            "name": "Field 12",
            "start_time": "2024-03-01T10:00:00Z",
            "end_time": end_time,
            "status": status,
            "output": outputs,
            "parameters": {"ndvi_threshold": 0.3}
        }))
        .unwrap()
    }

    fn now() -> DateTime<Utc> {
        parse_timestamp("2024-03-01T10:01:00Z").unwrap()
    }

    #[test]
    fn test_table_rows_and_footer() {
        let page = Paginated {
            items: vec![run("running", json!([])), run("completed", json!([]))],
            total: 12,
            skip: 0,
            take: 50,
        };
        let text = render_run_table(&page, now());
        assert!(text.contains("0f4b2c1e"));
        assert!(text.contains("running"));
        assert!(text.contains("1m"));
        assert!(text.contains("5m"));
        assert!(text.ends_with("Showing 1-2 of 12"));
    }

    #[test]
    fn test_empty_table() {
        let page: Paginated<WorkflowRun> = Paginated {
            items: vec![],
            total: 0,
            skip: 0,
            take: 50,
        };
        assert!(render_run_table(&page, now()).starts_with("No runs yet"));
    }

    #[test]
    fn test_detail_actions_follow_status() {
        let running = render_run_detail(&run("running", json!([])), now());
        assert!(running.contains("Actions:  cancel, resubmit"));
        assert!(running.contains("Results will be available"));

        let failed = render_run_detail(&run("failed", json!([])), now());
        assert!(failed.contains("Actions:  delete, resubmit"));
        assert!(failed.contains("ndvi_threshold = 0.3"));
    }

    #[test]
    fn test_detail_renders_outputs_when_completed() {
        let outputs = json!([{
            "name": "harvest_dates.csv",
            "mime_type": "text/csv",
            "type": "csv",
            "url": "https://example.com/harvest_dates.csv"
        }]);
        let text = render_run_detail(&run("completed", outputs), now());
        assert!(text.contains("Outputs (1):"));
        assert!(text.contains("Detected as: timeseries"));
    }
}
