use farmvibes_common::{Paginated, SystemMetrics, WorkflowRun};

use super::metrics::render_system_status;

const QUICK_START: [(&str, &str); 4] = [
    ("Browse Workflows", "farmvibes-dashboard workflows list"),
    ("Run a Workflow", "farmvibes-dashboard submit <workflow> ..."),
    ("Monitor Execution", "farmvibes-dashboard runs list --watch"),
    ("View Results", "farmvibes-dashboard runs show <id>"),
];

const USE_CASES: [&str; 5] = [
    "Harvest period detection using NDVI analysis",
    "Crop segmentation and classification",
    "Irrigation pattern monitoring",
    "Carbon footprint and GHG emissions estimation",
    "Forest change detection and monitoring",
];

/// Landing page. Sections whose data could not be loaded say so instead of
/// failing the whole page.
pub fn render_home(
    api_url: &str,
    metrics: Option<&SystemMetrics>,
    runs: Option<&Paginated<WorkflowRun>>,
) -> String {
    let mut lines = vec![
        "Welcome to FarmVibes.AI".to_string(),
        format!("Connected to {api_url}"),
        String::new(),
    ];

    match metrics {
        Some(metrics) => lines.push(render_system_status(metrics)),
        None => lines.push("Failed to load system metrics".to_string()),
    }
    lines.push(String::new());

    match runs {
        Some(page) => {
            let active = page.items.iter().filter(|r| r.status.is_active()).count();
            lines.push(format!("Runs: {} total, {active} active on this page", page.total));
        }
        None => lines.push("Failed to load runs".to_string()),
    }
    lines.push(String::new());

    lines.push("Quick Start".to_string());
    for (i, (step, command)) in QUICK_START.iter().enumerate() {
        lines.push(format!("  {}. {step:<18} {command}", i + 1));
    }
    lines.push(String::new());
    lines.push("Use Cases".to_string());
    lines.extend(USE_CASES.iter().map(|case| format!("  - {case}")));
    lines.join("\n")
}
