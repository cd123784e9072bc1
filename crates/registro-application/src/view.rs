//! Access-report view runtime.
//!
//! `AccessReportView` keeps one teacher's session list live: it loads the
//! sessions from the store, folds notifications from the update channel into
//! them, measures live sessions on a periodic tick, expires activity bursts,
//! and drives the selection and delete flow.
//!
//! All state sits behind one async mutex and is replaced as a whole by each
//! handler. Store calls are made with the lock released.
//!
//! Every background task is tied to the view's cancellation token, so
//! [`AccessReportView::close`] (or dropping the view) stops the tick, the
//! burst timers and the channel listener.

use crate::bus::{UpdateChannel, UpdateSubscription};
use crate::clock::Clock;
use chrono::{DateTime, FixedOffset};
use registro_core::config::ReportConfig;
use registro_core::error::{RegistroError, Result};
use registro_core::presence::{BurstTicket, PresenceState, PresenceTracker, Reconciliation};
use registro_core::report::{ReportTotals, SessionReport, aggregate};
use registro_core::selection::{DeleteRequest, DeleteScope, SelectionController, SelectionMode};
use registro_core::session::{SessionStore, UpdateEvent};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// A delete awaiting confirmation, with its prompt.
#[derive(Debug, Clone, Serialize)]
pub struct PendingDelete {
    pub prompt: String,
    pub request: DeleteRequest,
}

/// Read-only view model handed to the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSnapshot {
    pub owner_id: String,
    pub report: SessionReport,
    pub totals: ReportTotals,
    pub presence: BTreeMap<String, PresenceState>,
    /// Elapsed time of live sessions as of the last tick
    pub live_elapsed: BTreeMap<String, i64>,
    pub mode: SelectionMode,
    pub selected: BTreeSet<String>,
    pub pending_delete: Option<PendingDelete>,
    /// Last fetch or delete failure, cleared by a successful reload
    pub last_error: Option<RegistroError>,
}

struct ViewState {
    tracker: PresenceTracker,
    selection: SelectionController,
    measured_at: DateTime<FixedOffset>,
    last_error: Option<RegistroError>,
    ticker: Option<JoinHandle<()>>,
    burst_timers: HashMap<String, JoinHandle<()>>,
    listener: Option<JoinHandle<()>>,
}

struct ViewInner {
    owner_id: String,
    store: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    config: ReportConfig,
    cancel: CancellationToken,
    state: Mutex<ViewState>,
}

/// Live access report of one teacher.
pub struct AccessReportView {
    inner: Arc<ViewInner>,
}

impl AccessReportView {
    /// Subscribes to `channel`, loads the owner's sessions and starts the
    /// timers.
    ///
    /// A failed load does not fail the call: the error is kept in the
    /// snapshot and [`reload`](Self::reload) retries it.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error if `config` is invalid.
    pub async fn open(
        owner_id: impl Into<String>,
        store: Arc<dyn SessionStore>,
        channel: &UpdateChannel,
        clock: Arc<dyn Clock>,
        config: ReportConfig,
    ) -> Result<Self> {
        config.validate()?;
        let owner_id = owner_id.into();
        let now = clock.now();

        let view = Self {
            inner: Arc::new(ViewInner {
                owner_id: owner_id.clone(),
                store,
                clock,
                config,
                cancel: CancellationToken::new(),
                state: Mutex::new(ViewState {
                    tracker: PresenceTracker::new(owner_id.clone()),
                    selection: SelectionController::new(),
                    measured_at: now,
                    last_error: None,
                    ticker: None,
                    burst_timers: HashMap::new(),
                    listener: None,
                }),
            }),
        };

        // Subscribe before loading so nothing published meanwhile is missed.
        view.inner.spawn_listener(channel.subscribe()).await;
        tracing::info!(owner_id = %owner_id, topic = channel.topic(), "access report opened");

        if let Err(e) = view.reload().await {
            tracing::warn!(owner_id = %owner_id, error = %e, "initial load failed");
        }
        Ok(view)
    }

    pub fn owner_id(&self) -> &str {
        &self.inner.owner_id
    }

    /// Fetches the owner's sessions again, replacing the local list.
    pub async fn reload(&self) -> Result<()> {
        let inner = &self.inner;
        let fetched = inner.store.fetch_sessions_for_owner(&inner.owner_id).await;

        let mut state = inner.state.lock().await;
        match fetched {
            Ok(sessions) => {
                for session in &sessions {
                    if let Err(e) = session.validate() {
                        tracing::warn!(error = %e, "malformed session kept with clamped duration");
                    }
                }
                let now = inner.clock.now();
                let count = sessions.len();
                state.tracker.replace_sessions(sessions, now.timestamp_millis());
                state.measured_at = now;
                state.last_error = None;
                let displayed = state.tracker.session_ids();
                state.selection.retain_displayed(&displayed);
                inner.ensure_ticker(&mut state);
                tracing::info!(owner_id = %inner.owner_id, count, "sessions loaded");
                Ok(())
            }
            Err(e) => {
                let err = RegistroError::fetch(&inner.owner_id, e.to_string());
                state.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Builds the current view model.
    ///
    /// While sessions are live, durations are those of the last tick;
    /// otherwise the report is measured now.
    pub async fn snapshot(&self) -> ReportSnapshot {
        let inner = &self.inner;
        let state = inner.state.lock().await;
        let now = if state.tracker.has_live_sessions() {
            state.measured_at
        } else {
            inner.clock.now()
        };

        let report = aggregate(state.tracker.sessions(), &now);
        let presence = report
            .buckets
            .iter()
            .flat_map(|b| b.students.iter())
            .map(|g| (g.student_id.clone(), state.tracker.presence(&g.student_id)))
            .collect();
        let live_elapsed = state
            .tracker
            .sessions()
            .iter()
            .filter_map(|s| {
                state
                    .tracker
                    .live_elapsed(&s.session_id)
                    .map(|ms| (s.session_id.clone(), ms))
            })
            .collect();
        let pending_delete = state.selection.pending().map(|request| PendingDelete {
            prompt: request.prompt(),
            request: request.clone(),
        });

        ReportSnapshot {
            owner_id: inner.owner_id.clone(),
            totals: report.totals(),
            report,
            presence,
            live_elapsed,
            mode: state.selection.mode(),
            selected: state.selection.selected().clone(),
            pending_delete,
            last_error: state.last_error.clone(),
        }
    }

    pub async fn presence(&self, student_id: &str) -> PresenceState {
        self.inner.state.lock().await.tracker.presence(student_id)
    }

    // ============================================================================
    // Selection
    // ============================================================================

    pub async fn enter_selecting(&self) {
        self.inner.state.lock().await.selection.enter_selecting();
    }

    pub async fn cancel_selecting(&self) {
        self.inner.state.lock().await.selection.cancel();
    }

    /// Returns whether the session is selected afterwards.
    pub async fn toggle_item(&self, session_id: &str) -> bool {
        self.inner.state.lock().await.selection.toggle_item(session_id)
    }

    /// Toggles every session of a student within one day bucket.
    pub async fn toggle_group(&self, bucket_label: &str, student_id: &str) {
        let mut state = self.inner.state.lock().await;
        let ids = self.inner.group_ids(&state, bucket_label, student_id);
        state.selection.toggle_group(&ids);
    }

    pub async fn toggle_all(&self) {
        let mut state = self.inner.state.lock().await;
        let ids = state.tracker.session_ids();
        state.selection.toggle_all(&ids);
    }

    // ============================================================================
    // Deletion
    // ============================================================================

    /// Asks to delete one session. Returns the confirmation prompt.
    pub async fn request_delete_session(&self, session_id: &str) -> Option<String> {
        let mut state = self.inner.state.lock().await;
        if !state
            .tracker
            .sessions()
            .iter()
            .any(|s| s.session_id == session_id)
        {
            return None;
        }
        state
            .selection
            .request_delete(DeleteScope::SingleSession, [session_id])
            .map(DeleteRequest::prompt)
    }

    /// Asks to delete every session of a student within one day bucket.
    pub async fn request_delete_group(&self, bucket_label: &str, student_id: &str) -> Option<String> {
        let mut state = self.inner.state.lock().await;
        let ids = self.inner.group_ids(&state, bucket_label, student_id);
        let scope = DeleteScope::StudentGroup {
            student_id: student_id.to_string(),
        };
        state
            .selection
            .request_delete(scope, ids)
            .map(DeleteRequest::prompt)
    }

    /// Asks to delete the current selection.
    pub async fn request_delete_selection(&self) -> Option<String> {
        let mut state = self.inner.state.lock().await;
        state
            .selection
            .request_bulk_delete()
            .map(DeleteRequest::prompt)
    }

    pub async fn cancel_delete(&self) {
        self.inner.state.lock().await.selection.cancel_delete();
    }

    /// Executes the pending delete against the store.
    ///
    /// Local state changes only once the store reports success. On failure
    /// the request stays pending so the user can retry.
    ///
    /// Returns the number of sessions removed from the view; `0` when no
    /// delete was pending.
    pub async fn confirm_delete(&self) -> Result<usize> {
        let inner = &self.inner;
        let Some(request) = inner.state.lock().await.selection.take_pending() else {
            return Ok(0);
        };

        let outcome = inner
            .store
            .delete_sessions_and_activities(&request.session_ids)
            .await;

        let mut state = inner.state.lock().await;
        match outcome {
            Ok(()) => {
                let removed = state.tracker.remove_sessions(&request.session_ids);
                let remaining = state.tracker.sessions().len();
                state.selection.complete_delete(&request.session_ids, remaining);
                if state.last_error.as_ref().is_some_and(RegistroError::is_delete) {
                    state.last_error = None;
                }
                tracing::info!(owner_id = %inner.owner_id, removed, remaining, "sessions deleted");
                Ok(removed)
            }
            Err(e) => {
                let err = RegistroError::delete(request.session_ids.iter().cloned(), e.to_string());
                tracing::warn!(owner_id = %inner.owner_id, error = %err, "delete failed, view unchanged");
                state.selection.restore_pending(request);
                state.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    // ============================================================================
    // Lifecycle
    // ============================================================================

    /// Stops the tick, the burst timers and the channel listener.
    pub async fn close(&self) {
        self.inner.cancel.cancel();
        let mut state = self.inner.state.lock().await;
        if let Some(ticker) = state.ticker.take() {
            ticker.abort();
        }
        if let Some(listener) = state.listener.take() {
            listener.abort();
        }
        for (_, timer) in state.burst_timers.drain() {
            timer.abort();
        }
        tracing::info!(owner_id = %self.inner.owner_id, "access report closed");
    }

    pub fn is_closed(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }

    /// Whether the live-duration tick is currently scheduled.
    pub async fn is_ticking(&self) -> bool {
        self.inner
            .state
            .lock()
            .await
            .ticker
            .as_ref()
            .is_some_and(|t| !t.is_finished())
    }
}

impl Drop for AccessReportView {
    fn drop(&mut self) {
        self.inner.cancel.cancel();
    }
}

impl ViewInner {
    async fn spawn_listener(self: &Arc<Self>, mut subscription: UpdateSubscription) {
        let inner = Arc::clone(self);
        let handle = tokio::spawn(async move {
            loop {
                let event = tokio::select! {
                    _ = inner.cancel.cancelled() => break,
                    event = subscription.recv() => event,
                };
                match event {
                    Some(event) => inner.handle_event(event).await,
                    None => {
                        tracing::debug!(owner_id = %inner.owner_id, "update channel closed");
                        break;
                    }
                }
            }
        });
        self.state.lock().await.listener = Some(handle);
    }

    async fn handle_event(self: &Arc<Self>, event: UpdateEvent) {
        let now = self.clock.now();
        let mut state = self.state.lock().await;
        let kind = event.kind();

        match state.tracker.apply(&event, now.timestamp_millis()) {
            Reconciliation::Ignored(reason) => {
                tracing::debug!(%kind, ?reason, student_id = event.student_id(), "update ignored");
            }
            Reconciliation::SessionUpserted { session_id, inserted } => {
                tracing::debug!(%kind, %session_id, inserted, "session upserted");
                Self::remeasure(&mut state, now);
                self.ensure_ticker(&mut state);
            }
            Reconciliation::SessionClosed { session_id } => {
                tracing::debug!(%kind, %session_id, "session closed");
                Self::remeasure(&mut state, now);
            }
            Reconciliation::BurstStarted(ticket) => {
                tracing::debug!(%kind, student_id = %ticket.student_id, "activity burst");
                self.schedule_burst_expiry(&mut state, ticket);
            }
        }
    }

    /// Measures every live session at `now`, keeping member durations and
    /// group totals of the snapshot on the same instant.
    fn remeasure(state: &mut ViewState, now: DateTime<FixedOffset>) {
        state.tracker.tick(now.timestamp_millis());
        state.measured_at = now;
    }

    /// Starts the live-duration tick unless it runs already or nothing is live.
    fn ensure_ticker(self: &Arc<Self>, state: &mut ViewState) {
        if !state.tracker.has_live_sessions() || self.cancel.is_cancelled() {
            return;
        }
        if state.ticker.as_ref().is_some_and(|t| !t.is_finished()) {
            return;
        }

        let inner = Arc::clone(self);
        let period = self.config.tick_interval();
        state.ticker = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = inner.cancel.cancelled() => break,
                    _ = interval.tick() => {}
                }
                let now = inner.clock.now();
                let mut state = inner.state.lock().await;
                let live = state.tracker.tick(now.timestamp_millis());
                state.measured_at = now;
                if live == 0 {
                    // Cleared under the lock so `ensure_ticker` can restart it.
                    state.ticker = None;
                    tracing::debug!(owner_id = %inner.owner_id, "no live sessions, tick stopped");
                    break;
                }
            }
        }));
        tracing::debug!(owner_id = %self.owner_id, "tick started");
    }

    /// Arms the one-shot timer clearing a burst, replacing any earlier one
    /// for the same student.
    fn schedule_burst_expiry(self: &Arc<Self>, state: &mut ViewState, ticket: BurstTicket) {
        if let Some(previous) = state.burst_timers.remove(&ticket.student_id) {
            previous.abort();
        }
        if self.cancel.is_cancelled() {
            return;
        }

        let inner = Arc::clone(self);
        let delay = self.config.burst_duration();
        let student_id = ticket.student_id.clone();
        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = inner.cancel.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }
            let mut state = inner.state.lock().await;
            if state.tracker.expire_burst(&ticket) {
                state.burst_timers.remove(&ticket.student_id);
                tracing::debug!(student_id = %ticket.student_id, "activity burst expired");
            }
        });
        state.burst_timers.insert(student_id, handle);
    }

    fn group_ids(&self, state: &ViewState, bucket_label: &str, student_id: &str) -> Vec<String> {
        let now = if state.tracker.has_live_sessions() {
            state.measured_at
        } else {
            self.clock.now()
        };
        aggregate(state.tracker.sessions(), &now)
            .group(bucket_label, student_id)
            .map(|g| g.session_ids().map(str::to_string).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::AnchoredClock;
    use crate::test_support::MockSessionStore;
    use chrono::TimeZone;
    use registro_core::session::{ActivityRecord, SessionRecord};
    use std::time::Duration;

    const OWNER: &str = "prof-rossi";

    fn anchor() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(2 * 3600)
            .unwrap()
            .with_ymd_and_hms(2026, 10, 17, 10, 0, 0)
            .unwrap()
    }

    fn t0() -> i64 {
        anchor().timestamp_millis()
    }

    struct Fixture {
        store: Arc<MockSessionStore>,
        channel: UpdateChannel,
        view: AccessReportView,
    }

    async fn open(sessions: Vec<SessionRecord>) -> Fixture {
        let store = Arc::new(MockSessionStore::with_sessions(sessions));
        let channel = UpdateChannel::new("sessions", 64);
        let clock = Arc::new(AnchoredClock::new(anchor()));
        let view = AccessReportView::open(
            OWNER,
            store.clone(),
            &channel,
            clock,
            ReportConfig::default(),
        )
        .await
        .unwrap();
        Fixture {
            store,
            channel,
            view,
        }
    }

    /// Lets spawned tasks drain the channel.
    async fn settle() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_session_duration_is_formatted() {
        let fx = open(vec![
            SessionRecord::open("1", "anna", OWNER, t0() - 100_000).closed_at(t0() - 35_000),
        ])
        .await;

        let snapshot = fx.view.snapshot().await;
        let group = snapshot.report.group("Oggi", "anna").unwrap();
        assert_eq!(group.formatted_duration(), "1m 5s");
        assert_eq!(snapshot.presence["anna"], PresenceState::Offline);
        assert!(!fx.view.is_ticking().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_live_session_measured_by_tick() {
        let fx = open(vec![SessionRecord::open("2", "anna", OWNER, t0())]).await;
        assert!(fx.view.is_ticking().await);

        tokio::time::sleep(Duration::from_millis(3_100)).await;

        let snapshot = fx.view.snapshot().await;
        assert_eq!(snapshot.live_elapsed["2"], 3_000);
        assert_eq!(
            snapshot.report.group("Oggi", "anna").unwrap().formatted_duration(),
            "3s"
        );
        assert_eq!(snapshot.presence["anna"], PresenceState::Online);
    }

    #[tokio::test(start_paused = true)]
    async fn test_login_and_logout_notifications() {
        let fx = open(vec![
            SessionRecord::open("old", "anna", OWNER, t0() - 60_000).closed_at(t0() - 30_000),
        ])
        .await;
        assert!(!fx.view.is_ticking().await);

        let live = SessionRecord::open("new", "bruno", OWNER, t0());
        fx.channel.publish(UpdateEvent::Login {
            session: live.clone(),
        });
        fx.channel.publish(UpdateEvent::Login {
            session: live.clone(),
        });
        settle().await;

        let snapshot = fx.view.snapshot().await;
        let ids: Vec<_> = snapshot
            .report
            .flatten()
            .iter()
            .map(|s| s.session_id.clone())
            .collect();
        assert_eq!(ids, ["new", "old"]);
        assert_eq!(fx.view.presence("bruno").await, PresenceState::Online);
        assert!(fx.view.is_ticking().await);

        fx.channel.publish(UpdateEvent::Logout {
            session: live.closed_at(t0() + 5_000),
        });
        settle().await;
        assert_eq!(fx.view.presence("bruno").await, PresenceState::Offline);

        // The next tick finds nothing live and stops.
        tokio::time::sleep(Duration::from_millis(1_500)).await;
        assert!(!fx.view.is_ticking().await);
    }

    fn assert_groups_sum_members(snapshot: &ReportSnapshot) {
        for group in snapshot.report.buckets.iter().flat_map(|b| b.students.iter()) {
            let members: i64 = group
                .sessions
                .iter()
                .map(|s| {
                    snapshot
                        .live_elapsed
                        .get(&s.session_id)
                        .copied()
                        .unwrap_or_else(|| s.elapsed_ms(snapshot.report.measured_at))
                })
                .sum();
            assert_eq!(group.total_duration_ms, members, "group {}", group.student_id);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_group_total_matches_members_between_ticks() {
        let fx = open(vec![SessionRecord::open("s1", "anna", OWNER, t0())]).await;
        tokio::time::sleep(Duration::from_millis(1_600)).await;

        let second = SessionRecord::open("s2", "anna", OWNER, t0() + 1_600);
        fx.channel.publish(UpdateEvent::Login {
            session: second.clone(),
        });
        settle().await;

        let snapshot = fx.view.snapshot().await;
        assert_eq!(snapshot.report.group("Oggi", "anna").unwrap().session_count(), 2);
        assert!(snapshot.live_elapsed["s1"] >= 1_600);
        assert_groups_sum_members(&snapshot);

        tokio::time::sleep(Duration::from_millis(300)).await;
        fx.channel.publish(UpdateEvent::Logout {
            session: second.closed_at(t0() + 1_900),
        });
        settle().await;

        let snapshot = fx.view.snapshot().await;
        assert!(snapshot.live_elapsed["s1"] >= 1_900);
        assert_groups_sum_members(&snapshot);
    }

    #[tokio::test(start_paused = true)]
    async fn test_foreign_login_is_ignored() {
        let fx = open(vec![]).await;
        fx.channel.publish(UpdateEvent::Login {
            session: SessionRecord::open("x", "zoe", "prof-bianchi", t0()),
        });
        settle().await;

        assert!(fx.view.snapshot().await.report.is_empty());
        assert!(!fx.view.is_ticking().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_expires_after_two_seconds_unless_renewed() {
        let fx = open(vec![SessionRecord::open("1", "anna", OWNER, t0())]).await;
        let activity = || UpdateEvent::NewActivity {
            activity: ActivityRecord::new("anna", t0()).with_teacher(OWNER),
        };

        fx.channel.publish(activity());
        settle().await;
        assert_eq!(fx.view.presence("anna").await, PresenceState::OnlineWithBurst);

        tokio::time::sleep(Duration::from_millis(1_500)).await;
        fx.channel.publish(activity());
        settle().await;

        // First timer would have fired here; the renewal superseded it.
        tokio::time::sleep(Duration::from_millis(1_000)).await;
        assert_eq!(fx.view.presence("anna").await, PresenceState::OnlineWithBurst);

        tokio::time::sleep(Duration::from_millis(1_100)).await;
        assert_eq!(fx.view.presence("anna").await, PresenceState::Online);
    }

    #[tokio::test(start_paused = true)]
    async fn test_bulk_delete_empties_view_and_exits_selection() {
        let fx = open(vec![
            SessionRecord::open("1", "anna", OWNER, t0() - 100_000).closed_at(t0() - 35_000),
            SessionRecord::open("2", "bruno", OWNER, t0()),
        ])
        .await;

        fx.view.enter_selecting().await;
        fx.view.toggle_all().await;
        let prompt = fx.view.request_delete_selection().await.unwrap();
        assert_eq!(
            prompt,
            "Eliminare le 2 sessioni selezionate e le relative attività?"
        );
        // Nothing removed before confirmation.
        assert_eq!(fx.view.snapshot().await.totals.sessions, 2);

        assert_eq!(fx.view.confirm_delete().await.unwrap(), 2);

        let snapshot = fx.view.snapshot().await;
        assert!(snapshot.report.is_empty());
        assert_eq!(snapshot.mode, SelectionMode::Browsing);
        assert!(snapshot.selected.is_empty());
        assert!(snapshot.pending_delete.is_none());
        assert_eq!(fx.store.delete_calls(), 1);
        assert!(fx.store.sessions().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_delete_keeps_local_state() {
        let fx = open(vec![
            SessionRecord::open("1", "anna", OWNER, t0() - 100_000).closed_at(t0() - 35_000),
        ])
        .await;
        fx.store.fail_deletes(true);

        fx.view.request_delete_session("1").await.unwrap();
        let err = fx.view.confirm_delete().await.unwrap_err();
        assert!(err.is_delete());

        let snapshot = fx.view.snapshot().await;
        assert_eq!(snapshot.totals.sessions, 1);
        assert!(snapshot.pending_delete.is_some());
        assert!(snapshot.last_error.unwrap().is_delete());

        // Retry succeeds once the store recovers.
        fx.store.fail_deletes(false);
        assert_eq!(fx.view.confirm_delete().await.unwrap(), 1);
        assert!(fx.view.snapshot().await.report.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_group_toggle_and_group_delete() {
        let fx = open(vec![
            SessionRecord::open("a1", "anna", OWNER, t0() - 10_000).closed_at(t0() - 5_000),
            SessionRecord::open("b1", "bruno", OWNER, t0() - 20_000).closed_at(t0() - 5_000),
            SessionRecord::open("a2", "anna", OWNER, t0() - 30_000).closed_at(t0() - 25_000),
        ])
        .await;

        fx.view.enter_selecting().await;
        fx.view.toggle_item("a1").await;
        fx.view.toggle_group("Oggi", "anna").await;
        let selected: Vec<_> = fx.view.snapshot().await.selected.into_iter().collect();
        assert_eq!(selected, ["a1", "a2"]);

        fx.view.toggle_group("Oggi", "anna").await;
        assert!(fx.view.snapshot().await.selected.is_empty());

        let prompt = fx.view.request_delete_group("Oggi", "anna").await.unwrap();
        assert_eq!(
            prompt,
            "Eliminare tutte le 2 sessioni di anna e le relative attività?"
        );
        assert_eq!(fx.view.confirm_delete().await.unwrap(), 2);

        let snapshot = fx.view.snapshot().await;
        assert_eq!(snapshot.totals.sessions, 1);
        assert_eq!(snapshot.mode, SelectionMode::Selecting);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_delete_changes_nothing() {
        let fx = open(vec![SessionRecord::open("1", "anna", OWNER, t0())]).await;
        fx.view.request_delete_session("1").await.unwrap();
        fx.view.cancel_delete().await;

        assert_eq!(fx.view.confirm_delete().await.unwrap(), 0);
        assert_eq!(fx.store.delete_calls(), 0);
        assert!(fx.view.request_delete_session("missing").await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_failure_is_surfaced_and_retryable() {
        let store = Arc::new(MockSessionStore::with_sessions(vec![SessionRecord::open(
            "1", "anna", OWNER, t0(),
        )]));
        store.fail_fetches(true);
        let channel = UpdateChannel::new("sessions", 8);
        let view = AccessReportView::open(
            OWNER,
            store.clone(),
            &channel,
            Arc::new(AnchoredClock::new(anchor())),
            ReportConfig::default(),
        )
        .await
        .unwrap();

        let snapshot = view.snapshot().await;
        assert!(snapshot.report.is_empty());
        assert!(snapshot.last_error.unwrap().is_fetch());

        store.fail_fetches(false);
        view.reload().await.unwrap();
        let snapshot = view.snapshot().await;
        assert_eq!(snapshot.totals.sessions, 1);
        assert!(snapshot.last_error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_stops_timers_and_unsubscribes() {
        let fx = open(vec![SessionRecord::open("1", "anna", OWNER, t0())]).await;
        assert_eq!(fx.channel.subscriber_count(), 1);

        fx.view.close().await;
        settle().await;

        assert!(fx.view.is_closed());
        assert!(!fx.view.is_ticking().await);
        assert_eq!(fx.channel.subscriber_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_config_is_rejected() {
        let config = ReportConfig {
            tick_interval_ms: 0,
            ..ReportConfig::default()
        };
        let result = AccessReportView::open(
            OWNER,
            Arc::new(MockSessionStore::default()),
            &UpdateChannel::new("sessions", 8),
            Arc::new(AnchoredClock::new(anchor())),
            config,
        )
        .await;
        assert!(result.err().unwrap().is_config());
    }
}
