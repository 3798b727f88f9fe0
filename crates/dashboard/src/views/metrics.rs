use farmvibes_common::formatting::{format_percent, usage_bar, UsageLevel};
use farmvibes_common::SystemMetrics;

use super::render_polled;
use crate::polling::PollState;

const BAR_WIDTH: usize = 20;

fn level_label(level: UsageLevel) -> &'static str {
    match level {
        UsageLevel::Normal => "ok",
        UsageLevel::Elevated => "elevated",
        UsageLevel::Critical => "critical",
    }
}

fn metric_card(label: &str, value: f64) -> String {
    format!(
        "{label:<13} {:>6}  {}  {}",
        format_percent(value, 1),
        usage_bar(value, BAR_WIDTH),
        level_label(UsageLevel::for_percent(value))
    )
}

pub fn render_system_status(metrics: &SystemMetrics) -> String {
    let mut lines = vec![
        "System Status".to_string(),
        metric_card("CPU Usage", metrics.cpu_percent),
        metric_card("Memory Usage", metrics.memory_percent),
        metric_card("Disk Usage", metrics.disk_percent),
    ];
    if metrics.total_memory_gb > 0.0 {
        lines.push(format!(
            "Memory: {:.1} GB available of {:.1} GB",
            metrics.available_memory_gb, metrics.total_memory_gb
        ));
    }
    lines.join("\n")
}

pub fn render_system_status_state(state: &PollState<SystemMetrics>) -> String {
    render_polled(
        state,
        "Loading system status...",
        "Failed to load system metrics",
        render_system_status,
    )
}
