//! Process-local `SessionStore`, for demos and tests.

use crate::dto::SessionsDocument;
use async_trait::async_trait;
use registro_core::error::Result;
use registro_core::session::{ActivityRecord, EpochMillis, SessionRecord, SessionStore};
use std::collections::BTreeSet;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    document: RwLock<SessionsDocument>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-filled with `sessions`.
    pub fn with_sessions(sessions: &[SessionRecord]) -> Self {
        let mut document = SessionsDocument::default();
        for session in sessions {
            document.upsert_session(session);
        }
        Self {
            document: RwLock::new(document),
        }
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn fetch_sessions_for_owner(&self, owner_id: &str) -> Result<Vec<SessionRecord>> {
        Ok(self.document.read().await.sessions_for_owner(owner_id))
    }

    async fn delete_sessions_and_activities(&self, session_ids: &BTreeSet<String>) -> Result<()> {
        let removed = self.document.write().await.delete_sessions(session_ids);
        tracing::debug!(requested = session_ids.len(), removed, "deleted sessions");
        Ok(())
    }

    async fn insert_session(&self, session: &SessionRecord) -> Result<()> {
        self.document.write().await.upsert_session(session);
        Ok(())
    }

    async fn close_session(
        &self,
        session_id: &str,
        logout_timestamp: EpochMillis,
    ) -> Result<SessionRecord> {
        self.document
            .write()
            .await
            .close_session(session_id, logout_timestamp)
    }

    async fn record_activity(&self, activity: &ActivityRecord) -> Result<()> {
        self.document.write().await.record_activity(activity);
        Ok(())
    }

    async fn activities_for_student(&self, student_id: &str) -> Result<Vec<ActivityRecord>> {
        Ok(self.document.read().await.activities_for_student(student_id))
    }
}
