//! Live presence reconciliation.
//!
//! `PresenceTracker` holds the in-memory session list of one viewer and folds
//! update notifications into it. It owns no timers: the caller drives
//! [`PresenceTracker::tick`] and [`PresenceTracker::expire_burst`] from its
//! own scheduled tasks, which keeps this type deterministic under test.

use crate::session::{EpochMillis, SessionRecord, UpdateEvent, sort_by_recency};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// Presence of one student as shown in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PresenceState {
    Offline,
    Online,
    OnlineWithBurst,
}

/// Handle to one burst, used to clear it when its timer fires.
///
/// A newer burst for the same student gets a newer generation, so a stale
/// ticket clears nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BurstTicket {
    pub student_id: String,
    pub generation: u64,
}

/// Why a notification left the state untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Session or activity of another teacher
    ForeignOwner,
    /// Logout for a session this view never saw
    UnknownSession,
    /// Activity without an owner, for a student not in the view
    UnknownStudent,
    /// Logout for a session that is closed already
    AlreadyClosed,
}

/// Effect of applying one notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    Ignored(IgnoreReason),
    /// `inserted` is false when an existing record was replaced
    SessionUpserted { session_id: String, inserted: bool },
    SessionClosed { session_id: String },
    BurstStarted(BurstTicket),
}

/// In-memory sessions and transient presence flags of one viewer.
#[derive(Debug, Clone)]
pub struct PresenceTracker {
    owner_id: String,
    sessions: Vec<SessionRecord>,
    live_elapsed: HashMap<String, i64>,
    bursts: HashMap<String, u64>,
    next_generation: u64,
}

impl PresenceTracker {
    pub fn new(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            sessions: Vec::new(),
            live_elapsed: HashMap::new(),
            bursts: HashMap::new(),
            next_generation: 0,
        }
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    /// Sessions ordered by descending login time.
    pub fn sessions(&self) -> &[SessionRecord] {
        &self.sessions
    }

    /// Replaces the session list wholesale, as after a fetch.
    pub fn replace_sessions(&mut self, mut sessions: Vec<SessionRecord>, now_ms: EpochMillis) {
        sort_by_recency(&mut sessions);
        self.sessions = sessions;
        self.tick(now_ms);
    }

    /// Folds one notification into the state.
    ///
    /// Re-delivery of the same notification leaves the session list as it
    /// was after the first delivery.
    pub fn apply(&mut self, event: &UpdateEvent, now_ms: EpochMillis) -> Reconciliation {
        match event {
            UpdateEvent::Login { session } => {
                if session.teacher_id != self.owner_id {
                    return Reconciliation::Ignored(IgnoreReason::ForeignOwner);
                }
                self.upsert(session.clone(), now_ms)
            }
            UpdateEvent::Logout { session } => {
                if session.teacher_id != self.owner_id {
                    return Reconciliation::Ignored(IgnoreReason::ForeignOwner);
                }
                match self
                    .sessions
                    .iter_mut()
                    .find(|s| s.session_id == session.session_id)
                {
                    Some(existing) if !existing.is_live() => {
                        Reconciliation::Ignored(IgnoreReason::AlreadyClosed)
                    }
                    Some(existing) => {
                        *existing = session.clone();
                        if !existing.is_live() {
                            self.live_elapsed.remove(&session.session_id);
                        }
                        Reconciliation::SessionClosed {
                            session_id: session.session_id.clone(),
                        }
                    }
                    None => Reconciliation::Ignored(IgnoreReason::UnknownSession),
                }
            }
            UpdateEvent::NewActivity { activity } => {
                match activity.teacher_id.as_deref() {
                    Some(teacher) if teacher != self.owner_id => {
                        return Reconciliation::Ignored(IgnoreReason::ForeignOwner);
                    }
                    None if !self.knows_student(&activity.student_id) => {
                        return Reconciliation::Ignored(IgnoreReason::UnknownStudent);
                    }
                    _ => {}
                }
                Reconciliation::BurstStarted(self.start_burst(&activity.student_id))
            }
        }
    }

    fn upsert(&mut self, mut session: SessionRecord, now_ms: EpochMillis) -> Reconciliation {
        let session_id = session.session_id.clone();
        let inserted = match self.sessions.iter_mut().find(|s| s.session_id == session_id) {
            Some(existing) => {
                // A late LOGIN re-delivery must not reopen a closed session.
                if session.logout_timestamp.is_none() {
                    session.logout_timestamp = existing.logout_timestamp;
                }
                *existing = session;
                false
            }
            None => {
                self.sessions.insert(0, session);
                true
            }
        };
        sort_by_recency(&mut self.sessions);

        if let Some(s) = self.sessions.iter().find(|s| s.session_id == session_id) {
            if s.is_live() {
                self.live_elapsed
                    .insert(session_id.clone(), s.elapsed_ms(now_ms));
            }
        }
        Reconciliation::SessionUpserted {
            session_id,
            inserted,
        }
    }

    fn knows_student(&self, student_id: &str) -> bool {
        self.sessions.iter().any(|s| s.student_id == student_id)
    }

    fn start_burst(&mut self, student_id: &str) -> BurstTicket {
        self.next_generation += 1;
        self.bursts
            .insert(student_id.to_string(), self.next_generation);
        BurstTicket {
            student_id: student_id.to_string(),
            generation: self.next_generation,
        }
    }

    /// Clears a burst flag, unless a newer burst replaced it.
    ///
    /// Returns whether the flag was cleared.
    pub fn expire_burst(&mut self, ticket: &BurstTicket) -> bool {
        if self.bursts.get(&ticket.student_id) == Some(&ticket.generation) {
            self.bursts.remove(&ticket.student_id);
            true
        } else {
            false
        }
    }

    /// Recomputes the elapsed time of every live session.
    ///
    /// Returns the number of live sessions.
    pub fn tick(&mut self, now_ms: EpochMillis) -> usize {
        self.live_elapsed = self
            .sessions
            .iter()
            .filter(|s| s.is_live())
            .map(|s| (s.session_id.clone(), s.elapsed_ms(now_ms)))
            .collect();
        self.live_elapsed.len()
    }

    /// Elapsed milliseconds of a live session as of the last tick.
    pub fn live_elapsed(&self, session_id: &str) -> Option<i64> {
        self.live_elapsed.get(session_id).copied()
    }

    pub fn has_live_sessions(&self) -> bool {
        self.sessions.iter().any(SessionRecord::is_live)
    }

    pub fn presence(&self, student_id: &str) -> PresenceState {
        let online = self
            .sessions
            .iter()
            .any(|s| s.student_id == student_id && s.is_live());
        match (online, self.bursts.contains_key(student_id)) {
            (false, _) => PresenceState::Offline,
            (true, false) => PresenceState::Online,
            (true, true) => PresenceState::OnlineWithBurst,
        }
    }

    /// Drops the given sessions from the local list.
    ///
    /// Returns how many were removed.
    pub fn remove_sessions(&mut self, session_ids: &BTreeSet<String>) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|s| !session_ids.contains(&s.session_id));
        self.live_elapsed.retain(|id, _| !session_ids.contains(id));
        before - self.sessions.len()
    }

    pub fn session_ids(&self) -> Vec<String> {
        self.sessions.iter().map(|s| s.session_id.clone()).collect()
    }
}
