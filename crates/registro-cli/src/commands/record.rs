//! Producer commands: each persists one record and announces it.

use super::Context;
use anyhow::{Context as _, Result};
use registro_application::{AttendanceRecorder, Clock};

fn recorder(ctx: &Context) -> AttendanceRecorder {
    AttendanceRecorder::new(ctx.store.clone(), ctx.channel.clone(), ctx.clock.clone())
}

pub async fn login(ctx: &Context, student: &str, teacher: &str) -> Result<()> {
    let session = recorder(ctx).login(student, teacher).await?;
    println!("{}", session.session_id);
    Ok(())
}

pub async fn logout(ctx: &Context, session_id: &str) -> Result<()> {
    let session = recorder(ctx)
        .logout(session_id)
        .await
        .with_context(|| format!("Failed to close session {}", session_id))?;
    println!(
        "{} {}",
        session.session_id,
        registro_core::report::format_duration(session.elapsed_ms(ctx.clock.now_ms()))
    );
    Ok(())
}

pub async fn activity(ctx: &Context, student: &str, teacher: Option<&str>) -> Result<()> {
    recorder(ctx).record_activity(student, teacher).await?;
    Ok(())
}
