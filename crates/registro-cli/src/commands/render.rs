//! Plain-text rendering of report snapshots.

use chrono::{DateTime, FixedOffset, Utc};
use registro_application::ReportSnapshot;
use registro_core::presence::PresenceState;
use registro_core::report::{UNAVAILABLE, format_duration};
use registro_core::session::{EpochMillis, SessionRecord};
use std::fmt::Write as _;

fn presence_label(state: PresenceState) -> &'static str {
    match state {
        PresenceState::Offline => "offline",
        PresenceState::Online => "online",
        PresenceState::OnlineWithBurst => "online *",
    }
}

fn clock_time(ms: EpochMillis, now: &DateTime<FixedOffset>) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map(|t| t.with_timezone(&now.timezone()).format("%H:%M:%S").to_string())
        .unwrap_or_else(|| UNAVAILABLE.to_string())
}

fn session_line(
    session: &SessionRecord,
    snapshot: &ReportSnapshot,
    now: &DateTime<FixedOffset>,
) -> String {
    let elapsed = snapshot
        .live_elapsed
        .get(&session.session_id)
        .copied()
        .unwrap_or_else(|| session.elapsed_ms(snapshot.report.measured_at));
    let end = match session.logout_timestamp {
        Some(logout) => clock_time(logout, now),
        None => "in corso".to_string(),
    };
    let marker = if snapshot.selected.contains(&session.session_id) {
        "[x] "
    } else {
        ""
    };
    format!(
        "    {}{} - {}  {}  ({})",
        marker,
        clock_time(session.login_timestamp, now),
        end,
        format_duration(elapsed),
        session.session_id
    )
}

/// Renders the snapshot as an indented day / student / session listing.
pub fn render_snapshot(snapshot: &ReportSnapshot, now: &DateTime<FixedOffset>) -> String {
    let mut out = String::new();
    if let Some(err) = &snapshot.last_error {
        if err.is_retryable() {
            let _ = writeln!(out, "! {} (riprovare)", err);
        } else {
            let _ = writeln!(out, "! {}", err);
        }
    }
    if snapshot.report.is_empty() {
        let _ = writeln!(out, "Nessuna sessione per {}", snapshot.owner_id);
        return out;
    }

    for bucket in &snapshot.report.buckets {
        let _ = writeln!(out, "{}", bucket.bucket);
        for group in &bucket.students {
            let presence = snapshot
                .presence
                .get(&group.student_id)
                .copied()
                .unwrap_or(PresenceState::Offline);
            let _ = writeln!(
                out,
                "  {}  [{}]  {} sessioni  {}",
                group.student_id,
                presence_label(presence),
                group.session_count(),
                group.formatted_duration()
            );
            for session in &group.sessions {
                let _ = writeln!(out, "{}", session_line(session, snapshot, now));
            }
        }
    }

    let totals = snapshot.totals;
    let _ = writeln!(
        out,
        "Totale: {} sessioni ({} in corso), {} studenti, {}",
        totals.sessions,
        totals.live_sessions,
        totals.students,
        format_duration(totals.total_duration_ms)
    );
    out
}
