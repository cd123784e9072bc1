//! Session store trait.
//!
//! Defines the interface for session and activity persistence.

use super::model::{ActivityRecord, EpochMillis, SessionRecord};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::BTreeSet;

/// An abstract store for session and activity records.
///
/// This trait decouples the report logic from the storage mechanism
/// (TOML file, in-memory map, remote API).
///
/// # Implementation Notes
///
/// Implementations should handle:
/// - Upsert semantics for `insert_session`
/// - All-or-nothing deletion in `delete_sessions_and_activities`
/// - Concurrent access if needed
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Lists the sessions owned by a teacher, most recent login first.
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<SessionRecord>)`: Sessions ordered by descending login time
    /// - `Err(_)`: Error occurred during retrieval
    async fn fetch_sessions_for_owner(&self, owner_id: &str) -> Result<Vec<SessionRecord>>;

    /// Deletes the given sessions together with the activities recorded
    /// during them.
    ///
    /// Either every id is removed or none is. Unknown ids are ignored.
    async fn delete_sessions_and_activities(&self, session_ids: &BTreeSet<String>) -> Result<()>;

    /// Saves a session, replacing any record with the same id.
    async fn insert_session(&self, session: &SessionRecord) -> Result<()>;

    /// Sets the logout time of a live session and returns the updated record.
    ///
    /// # Returns
    ///
    /// - `Ok(SessionRecord)`: The closed session
    /// - `Err(NotFound)`: No session with that id
    /// - `Err(AlreadyClosed)`: The session has a logout time already; the
    ///   stored record is unchanged
    async fn close_session(
        &self,
        session_id: &str,
        logout_timestamp: EpochMillis,
    ) -> Result<SessionRecord>;

    /// Appends an activity record.
    async fn record_activity(&self, activity: &ActivityRecord) -> Result<()>;

    /// Lists the activities of a student, oldest first.
    async fn activities_for_student(&self, student_id: &str) -> Result<Vec<ActivityRecord>>;
}

/// Sorts sessions by descending login time, keeping the relative order of
/// equal timestamps.
pub fn sort_by_recency(sessions: &mut [SessionRecord]) {
    sessions.sort_by(|a, b| b.login_timestamp.cmp(&a.login_timestamp));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_by_recency_is_stable() {
        let mut sessions = vec![
            SessionRecord::open("a", "s1", "t", 10),
            SessionRecord::open("b", "s2", "t", 30),
            SessionRecord::open("c", "s3", "t", 10),
            SessionRecord::open("d", "s4", "t", 20),
        ];
        sort_by_recency(&mut sessions);
        let ids: Vec<_> = sessions.iter().map(|s| s.session_id.as_str()).collect();
        assert_eq!(ids, ["b", "d", "a", "c"]);
    }
}
