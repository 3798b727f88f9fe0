use farmvibes_common::comparison::{comparable_runs, compare};
use farmvibes_common::WorkflowRun;
use futures::future::join_all;
use tracing::warn;

use super::{CommandError, Context};
use crate::api::RunQuery;
use crate::views::compare::{render_comparison, sort_runs, CompareSort};

async fn fetch_runs(ctx: &Context, ids: &[String]) -> Result<Vec<WorkflowRun>, CommandError> {
    if ids.is_empty() {
        return Ok(ctx.client.list_runs(&RunQuery::default()).await?.items);
    }
    let results = join_all(ids.iter().map(|id| ctx.client.get_run(id))).await;
    results
        .into_iter()
        .collect::<Result<Vec<_>, _>>()
        .map_err(CommandError::from)
}

/// Compares the given runs, or every comparable run on the first page when
/// no ids are given.
pub async fn run(ctx: &Context, ids: &[String], sort: CompareSort) -> Result<(), CommandError> {
    let fetched = fetch_runs(ctx, ids).await?;
    let mut selected = comparable_runs(&fetched);

    for run in &fetched {
        if !selected.iter().any(|s| s.id == run.id) && !ids.is_empty() {
            warn!(run_id = %run.id, status = %run.status, "Skipping run that is not completed or has no outputs.");
            println!("Skipping '{}': not completed or has no outputs.", run.name);
        }
    }

    let Some(metrics) = compare(&selected) else {
        return Err(CommandError::NotAllowed(
            "No completed runs available for comparison".to_string(),
        ));
    };
    sort_runs(&mut selected, sort);
    println!("{}", render_comparison(&selected, &metrics));
    Ok(())
}
