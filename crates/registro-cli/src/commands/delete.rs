//! `registro delete`: the select-and-confirm flow of the live view, driven
//! from the command line.

use super::Context;
use anyhow::{Result, bail};
use registro_application::AccessReportView;
use std::collections::BTreeSet;
use std::io::{BufRead, Write};

pub async fn run(ctx: &Context, owner: &str, session_ids: &[String], yes: bool) -> Result<()> {
    let view = AccessReportView::open(
        owner,
        ctx.store.clone(),
        &ctx.channel,
        ctx.clock.clone(),
        ctx.config.clone(),
    )
    .await?;
    let result = delete_with_view(&view, session_ids, yes).await;
    view.close().await;
    result
}

async fn delete_with_view(view: &AccessReportView, session_ids: &[String], yes: bool) -> Result<()> {
    let snapshot = view.snapshot().await;
    if let Some(err) = snapshot.last_error {
        bail!(err);
    }

    let known: BTreeSet<&str> = snapshot
        .report
        .flatten()
        .into_iter()
        .map(|s| s.session_id.as_str())
        .collect();
    let unknown: Vec<&str> = session_ids
        .iter()
        .map(String::as_str)
        .filter(|id| !known.contains(id))
        .collect();
    if !unknown.is_empty() {
        bail!("Unknown session(s) for {}: {}", view.owner_id(), unknown.join(", "));
    }

    let prompt = match session_ids {
        [single] => view.request_delete_session(single).await,
        many => {
            view.enter_selecting().await;
            for id in many {
                view.toggle_item(id).await;
            }
            view.request_delete_selection().await
        }
    };
    let Some(prompt) = prompt else {
        return Ok(());
    };

    if !yes && !confirm(&prompt)? {
        view.cancel_delete().await;
        println!("Annullato");
        return Ok(());
    }

    let removed = view.confirm_delete().await?;
    println!("{} sessioni eliminate", removed);
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    let mut stdout = std::io::stdout().lock();
    write!(stdout, "{} [s/N] ", prompt)?;
    stdout.flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "s" | "si" | "sì" | "y" | "yes"))
}
