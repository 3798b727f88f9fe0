use super::{CommandError, Context};
use crate::api::RunQuery;
use crate::views::home::render_home;

pub async fn show(ctx: &Context) -> Result<(), CommandError> {
    let query = RunQuery::default();
    let (metrics, runs) = futures::join!(ctx.client.system_metrics(), ctx.client.list_runs(&query));
    println!(
        "{}",
        render_home(ctx.client.base_url(), metrics.ok().as_ref(), runs.ok().as_ref())
    );
    Ok(())
}
