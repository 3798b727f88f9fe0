use super::{first_result, watch, CommandError, Context};
use crate::polling::MetricsSource;
use crate::views::metrics::{render_system_status, render_system_status_state};

pub async fn show(ctx: &Context, follow: bool) -> Result<(), CommandError> {
    let handle = MetricsSource::new(ctx.client.clone()).poll();
    if follow {
        return watch(handle, render_system_status_state, |_| false).await;
    }
    let metrics = first_result(&handle).await?;
    println!("{}", render_system_status(&metrics));
    Ok(())
}
