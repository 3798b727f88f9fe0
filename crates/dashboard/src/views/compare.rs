use clap::ValueEnum;
use farmvibes_common::comparison::ComparisonMetrics;
use farmvibes_common::formatting::format_elapsed_secs;
use farmvibes_common::WorkflowRun;

use super::{short_id, truncate};

/// Column order of the side-by-side table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum CompareSort {
    #[default]
    ExecutionTime,
    OutputCount,
    Status,
}

fn execution_secs(run: &WorkflowRun) -> i64 {
    match (run.started_at(), run.ended_at()) {
        (Some(start), Some(end)) => (end - start).num_seconds(),
        _ => 0,
    }
}

pub fn sort_runs(runs: &mut [&WorkflowRun], sort: CompareSort) {
    match sort {
        CompareSort::ExecutionTime => runs.sort_by_key(|run| std::cmp::Reverse(execution_secs(run))),
        CompareSort::OutputCount => runs.sort_by_key(|run| std::cmp::Reverse(run.output.len())),
        CompareSort::Status => runs.sort_by_key(|run| run.status.as_str()),
    }
}

pub fn render_comparison(runs: &[&WorkflowRun], metrics: &ComparisonMetrics) -> String {
    let mut lines = vec![
        format!("Comparing {} runs", runs.len()),
        format!(
            "Execution time: average {}, range {} - {}",
            format_elapsed_secs(metrics.average_time.num_seconds()),
            format_elapsed_secs(metrics.min_time.num_seconds()),
            format_elapsed_secs(metrics.max_time.num_seconds())
        ),
        format!("Outputs: {} combined", metrics.total_outputs),
        String::new(),
        format!(
            "{:<10}  {:<24}  {:<10}  {:<8}  {:<20}  {}",
            "RUN", "NAME", "STATUS", "DURATION", "STARTED", "OUTPUTS"
        ),
    ];
    for run in runs {
        lines.push(format!(
            "{:<10}  {:<24}  {:<10}  {:<8}  {:<20}  {}",
            short_id(&run.id),
            truncate(&run.name, 24),
            run.status.as_str(),
            format_elapsed_secs(execution_secs(run)),
            truncate(&run.start_time, 20),
            run.output.len()
        ));
    }

    for run in runs {
        lines.push(String::new());
        lines.push(format!("{} ({})", run.name, short_id(&run.id)));
        if let Some(parameters) = run.parameters.as_ref().filter(|p| !p.is_empty()) {
            for (key, value) in parameters {
                lines.push(format!("  {key} = {value}"));
            }
        }
        for output in &run.output {
            lines.push(format!("  {} ({})  {}", output.name, output.mime_type, output.url));
        }
    }
    lines.join("\n")
}
