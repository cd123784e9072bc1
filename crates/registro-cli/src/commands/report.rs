use super::Context;
use super::render::render_snapshot;
use anyhow::{Result, bail};
use registro_application::{AccessReportView, Clock};

/// Loads the owner's sessions once and prints the grouped report.
pub async fn run(ctx: &Context, owner: &str, json: bool) -> Result<()> {
    let view = AccessReportView::open(
        owner,
        ctx.store.clone(),
        &ctx.channel,
        ctx.clock.clone(),
        ctx.config.clone(),
    )
    .await?;
    let snapshot = view.snapshot().await;
    view.close().await;

    if let Some(err) = snapshot.last_error {
        bail!(err);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print!("{}", render_snapshot(&snapshot, &ctx.clock.now()));
    }
    Ok(())
}
