//! `registro demo`: a live report fed by scripted notifications.

use super::Context;
use super::render::render_snapshot;
use anyhow::Result;
use registro_application::{AccessReportView, AttendanceRecorder, Clock};
use std::time::Duration;

const DEMO_TEACHER: &str = "prof-rossi";

pub async fn run(ctx: &Context, pace_ms: u64) -> Result<()> {
    let pace = Duration::from_millis(pace_ms);
    let view = AccessReportView::open(
        DEMO_TEACHER,
        ctx.store.clone(),
        &ctx.channel,
        ctx.clock.clone(),
        ctx.config.clone(),
    )
    .await?;
    let recorder =
        AttendanceRecorder::new(ctx.store.clone(), ctx.channel.clone(), ctx.clock.clone());

    let anna = recorder.login("anna", DEMO_TEACHER).await?;
    recorder.login("bruno", DEMO_TEACHER).await?;
    recorder.login("carla", "prof-bianchi").await?;
    step(ctx, &view, "Accessi di anna e bruno", pace).await;

    recorder.record_activity("anna", Some(DEMO_TEACHER)).await?;
    step(ctx, &view, "Attività di anna", Duration::from_millis(100)).await;
    tokio::time::sleep(pace).await;

    recorder.logout(&anna.session_id).await?;
    step(ctx, &view, "Uscita di anna", pace).await;

    view.enter_selecting().await;
    view.toggle_all().await;
    if let Some(prompt) = view.request_delete_selection().await {
        println!("== {} (sì)", prompt);
        let removed = view.confirm_delete().await?;
        step(ctx, &view, &format!("{} sessioni eliminate", removed), Duration::ZERO).await;
    }

    view.close().await;
    Ok(())
}

async fn step(ctx: &Context, view: &AccessReportView, title: &str, wait: Duration) {
    tokio::time::sleep(wait).await;
    let snapshot = view.snapshot().await;
    println!("== {}", title);
    print!("{}", render_snapshot(&snapshot, &ctx.clock.now()));
    println!();
}
