//! In-memory `SessionStore` with failure switches, for unit tests.

use async_trait::async_trait;
use registro_core::error::{RegistroError, Result};
use registro_core::session::{
    ActivityRecord, EpochMillis, SessionRecord, SessionStore, sort_by_recency,
};
use std::collections::BTreeSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[derive(Default)]
pub struct MockSessionStore {
    sessions: Mutex<Vec<SessionRecord>>,
    activities: Mutex<Vec<ActivityRecord>>,
    fail_fetches: AtomicBool,
    fail_deletes: AtomicBool,
    delete_calls: AtomicUsize,
}

impl MockSessionStore {
    pub fn with_sessions(sessions: Vec<SessionRecord>) -> Self {
        Self {
            sessions: Mutex::new(sessions),
            ..Self::default()
        }
    }

    pub fn fail_fetches(&self, fail: bool) {
        self.fail_fetches.store(fail, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    pub fn sessions(&self) -> Vec<SessionRecord> {
        self.sessions.lock().unwrap().clone()
    }

    pub fn activities(&self) -> Vec<ActivityRecord> {
        self.activities.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionStore for MockSessionStore {
    async fn fetch_sessions_for_owner(&self, owner_id: &str) -> Result<Vec<SessionRecord>> {
        if self.fail_fetches.load(Ordering::SeqCst) {
            return Err(RegistroError::io("store unreachable"));
        }
        let mut owned: Vec<_> = self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.teacher_id == owner_id)
            .cloned()
            .collect();
        sort_by_recency(&mut owned);
        Ok(owned)
    }

    async fn delete_sessions_and_activities(&self, session_ids: &BTreeSet<String>) -> Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(RegistroError::io("disk full"));
        }
        self.sessions
            .lock()
            .unwrap()
            .retain(|s| !session_ids.contains(&s.session_id));
        Ok(())
    }

    async fn insert_session(&self, session: &SessionRecord) -> Result<()> {
        let mut sessions = self.sessions.lock().unwrap();
        sessions.retain(|s| s.session_id != session.session_id);
        sessions.push(session.clone());
        Ok(())
    }

    async fn close_session(
        &self,
        session_id: &str,
        logout_timestamp: EpochMillis,
    ) -> Result<SessionRecord> {
        let mut sessions = self.sessions.lock().unwrap();
        let session = sessions
            .iter_mut()
            .find(|s| s.session_id == session_id)
            .ok_or_else(|| RegistroError::not_found("Session", session_id))?;
        if let Some(closed_at) = session.logout_timestamp {
            return Err(RegistroError::already_closed(session_id, closed_at));
        }
        session.logout_timestamp = Some(logout_timestamp);
        Ok(session.clone())
    }

    async fn record_activity(&self, activity: &ActivityRecord) -> Result<()> {
        self.activities.lock().unwrap().push(activity.clone());
        Ok(())
    }

    async fn activities_for_student(&self, student_id: &str) -> Result<Vec<ActivityRecord>> {
        Ok(self
            .activities
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.student_id == student_id)
            .cloned()
            .collect())
    }
}
