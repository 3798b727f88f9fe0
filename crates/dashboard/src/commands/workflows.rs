use super::{first_result, CommandError, Context};
use crate::polling::{WorkflowListSource, WorkflowSource};
use crate::views::workflows::{render_catalog, render_description};

pub async fn list(ctx: &Context, search: Option<&str>) -> Result<(), CommandError> {
    let handle = WorkflowListSource::new(ctx.client.clone()).load();
    let workflows = first_result(&handle).await?;
    println!("{}", render_catalog(&workflows, search));
    Ok(())
}

pub async fn describe(ctx: &Context, name: &str) -> Result<(), CommandError> {
    let handle = WorkflowSource::new(ctx.client.clone(), name).load();
    let workflow = first_result(&handle).await?;
    println!("{}", render_description(&workflow));
    Ok(())
}

pub async fn yaml(ctx: &Context, name: &str) -> Result<(), CommandError> {
    let text = ctx.client.workflow_yaml(name).await?;
    println!("{}", text.trim_end());
    Ok(())
}
