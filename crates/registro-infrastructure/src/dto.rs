//! Persisted shapes of sessions and activities.
//!
//! `SessionsDocument` is what both stores hold: the in-memory store keeps
//! one in a lock, the TOML store keeps one on disk. The query and mutation
//! rules live here so the two stores agree.

use registro_core::error::{RegistroError, Result};
use registro_core::session::{ActivityRecord, EpochMillis, SessionRecord, sort_by_recency};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const DOCUMENT_VERSION: u32 = 1;

fn default_version() -> u32 {
    DOCUMENT_VERSION
}

/// Stored form of a [`SessionRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDto {
    pub id: String,
    pub student_id: String,
    pub teacher_id: String,
    pub login_ms: EpochMillis,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logout_ms: Option<EpochMillis>,
}

impl From<&SessionRecord> for SessionDto {
    fn from(record: &SessionRecord) -> Self {
        Self {
            id: record.session_id.clone(),
            student_id: record.student_id.clone(),
            teacher_id: record.teacher_id.clone(),
            login_ms: record.login_timestamp,
            logout_ms: record.logout_timestamp,
        }
    }
}

impl From<&SessionDto> for SessionRecord {
    fn from(dto: &SessionDto) -> Self {
        Self {
            session_id: dto.id.clone(),
            student_id: dto.student_id.clone(),
            teacher_id: dto.teacher_id.clone(),
            login_timestamp: dto.login_ms,
            logout_timestamp: dto.logout_ms,
        }
    }
}

/// Stored form of an [`ActivityRecord`], tied to the session it happened in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityDto {
    /// Live session of the student when the activity was recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub student_id: String,
    pub timestamp_ms: EpochMillis,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<String>,
}

impl From<&ActivityDto> for ActivityRecord {
    fn from(dto: &ActivityDto) -> Self {
        Self {
            student_id: dto.student_id.clone(),
            timestamp: dto.timestamp_ms,
            teacher_id: dto.teacher_id.clone(),
        }
    }
}

/// All sessions and activities of one store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionsDocument {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub sessions: Vec<SessionDto>,
    #[serde(default)]
    pub activities: Vec<ActivityDto>,
}

impl Default for SessionsDocument {
    fn default() -> Self {
        Self {
            version: DOCUMENT_VERSION,
            sessions: Vec::new(),
            activities: Vec::new(),
        }
    }
}

impl SessionsDocument {
    /// Sessions of `owner_id`, most recent login first.
    pub fn sessions_for_owner(&self, owner_id: &str) -> Vec<SessionRecord> {
        let mut sessions: Vec<SessionRecord> = self
            .sessions
            .iter()
            .filter(|s| s.teacher_id == owner_id)
            .map(SessionRecord::from)
            .collect();
        sort_by_recency(&mut sessions);
        sessions
    }

    /// Removes the sessions and every activity recorded during them.
    ///
    /// Returns the number of sessions removed.
    pub fn delete_sessions(&mut self, session_ids: &BTreeSet<String>) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|s| !session_ids.contains(&s.id));
        self.activities.retain(|a| {
            a.session_id
                .as_ref()
                .is_none_or(|id| !session_ids.contains(id))
        });
        before - self.sessions.len()
    }

    pub fn upsert_session(&mut self, session: &SessionRecord) {
        let dto = SessionDto::from(session);
        match self.sessions.iter_mut().find(|s| s.id == dto.id) {
            Some(existing) => *existing = dto,
            None => self.sessions.push(dto),
        }
    }

    /// Sets the logout time of a live session.
    ///
    /// A session is closed once: closing it again is an `AlreadyClosed`
    /// error and leaves the record as it was.
    pub fn close_session(
        &mut self,
        session_id: &str,
        logout_timestamp: EpochMillis,
    ) -> Result<SessionRecord> {
        let dto = self
            .sessions
            .iter_mut()
            .find(|s| s.id == session_id)
            .ok_or_else(|| RegistroError::not_found("Session", session_id))?;
        if let Some(closed_at) = dto.logout_ms {
            return Err(RegistroError::already_closed(session_id, closed_at));
        }
        dto.logout_ms = Some(logout_timestamp);
        Ok(SessionRecord::from(&*dto))
    }

    /// Appends an activity, linking it to the student's latest live session.
    pub fn record_activity(&mut self, activity: &ActivityRecord) {
        let session_id = self
            .sessions
            .iter()
            .filter(|s| s.student_id == activity.student_id && s.logout_ms.is_none())
            .max_by_key(|s| s.login_ms)
            .map(|s| s.id.clone());
        self.activities.push(ActivityDto {
            session_id,
            student_id: activity.student_id.clone(),
            timestamp_ms: activity.timestamp,
            teacher_id: activity.teacher_id.clone(),
        });
    }

    pub fn activities_for_student(&self, student_id: &str) -> Vec<ActivityRecord> {
        let mut activities: Vec<ActivityRecord> = self
            .activities
            .iter()
            .filter(|a| a.student_id == student_id)
            .map(ActivityRecord::from)
            .collect();
        activities.sort_by_key(|a| a.timestamp);
        activities
    }
}
