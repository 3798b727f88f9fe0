use chrono::Utc;
use farmvibes_common::WorkflowRun;
use tracing::info;

use super::{confirm, first_result, watch, CommandError, Context};
use crate::api::RunQuery;
use crate::polling::{RunListSource, RunSource};
use crate::views::render_polled;
use crate::views::runs::{render_run_detail, render_run_table};

pub async fn list(ctx: &Context, query: RunQuery, follow: bool) -> Result<(), CommandError> {
    let handle = RunListSource::new(ctx.client.clone(), query).poll();
    if follow {
        return watch(
            handle,
            |state| {
                render_polled(state, "Loading runs...", "Failed to load runs", |page| {
                    render_run_table(page, Utc::now())
                })
            },
            |_| false,
        )
        .await;
    }
    let page = first_result(&handle).await?;
    println!("{}", render_run_table(&page, Utc::now()));
    Ok(())
}

pub async fn show(ctx: &Context, id: &str, follow: bool) -> Result<(), CommandError> {
    let handle = RunSource::new(ctx.client.clone(), id).poll();
    if follow {
        return watch(
            handle,
            |state| {
                render_polled(state, "Loading run...", "Failed to load run", |run| {
                    render_run_detail(run, Utc::now())
                })
            },
            |run: &WorkflowRun| run.status.is_terminal(),
        )
        .await;
    }
    let run = first_result(&handle).await?;
    println!("{}", render_run_detail(&run, Utc::now()));
    Ok(())
}

pub async fn cancel(ctx: &Context, id: &str, assume_yes: bool) -> Result<(), CommandError> {
    let run = ctx.client.get_run(id).await?;
    if !run.can_cancel() {
        return Err(CommandError::NotAllowed(format!(
            "Run '{}' is {} and cannot be cancelled; only running runs can.",
            run.name, run.status
        )));
    }
    if !assume_yes && !confirm(&format!("Cancel run '{}'?", run.name))? {
        println!("Aborted.");
        return Ok(());
    }
    ctx.client.cancel_run(id).await?;
    info!(run_id = %id, "Run cancelled.");
    println!("Cancelled run '{}' ({id}).", run.name);
    Ok(())
}

pub async fn delete(ctx: &Context, id: &str, assume_yes: bool) -> Result<(), CommandError> {
    let run = ctx.client.get_run(id).await?;
    if !run.can_delete() {
        return Err(CommandError::NotAllowed(format!(
            "Run '{}' is still running; cancel it before deleting.",
            run.name
        )));
    }
    if !assume_yes && !confirm(&format!("Delete run '{}'? This cannot be undone.", run.name))? {
        println!("Aborted.");
        return Ok(());
    }
    ctx.client.delete_run(id).await?;
    info!(run_id = %id, "Run deleted.");
    println!("Deleted run '{}' ({id}).", run.name);
    Ok(())
}

pub async fn resubmit(ctx: &Context, id: &str) -> Result<(), CommandError> {
    let run = ctx.client.resubmit_run(id).await?;
    info!(run_id = %run.id, previous = %id, "Run resubmitted.");
    println!("Resubmitted as run {} ({}).", run.id, run.status);
    Ok(())
}
