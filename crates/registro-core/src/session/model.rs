//! Session and activity records.
//!
//! These are the "pure" domain records exchanged with the session store and
//! the update channel. Field names serialize in camelCase to match the wire
//! format used by the other views of the registry.

use crate::error::{RegistroError, Result};
use serde::{Deserialize, Serialize};

/// Milliseconds since the Unix epoch.
pub type EpochMillis = i64;

/// One student login, closed by a logout or still live.
///
/// Created on student login, mutated once (logout) or never again, deleted
/// only by an explicit teacher action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// Unique session identifier
    pub session_id: String,
    /// Student who logged in
    pub student_id: String,
    /// Teacher owning the report this session belongs to
    pub teacher_id: String,
    /// Login time
    pub login_timestamp: EpochMillis,
    /// Logout time; `None` while the session is live
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logout_timestamp: Option<EpochMillis>,
}

impl SessionRecord {
    /// Creates a live session.
    pub fn open(
        session_id: impl Into<String>,
        student_id: impl Into<String>,
        teacher_id: impl Into<String>,
        login_timestamp: EpochMillis,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            student_id: student_id.into(),
            teacher_id: teacher_id.into(),
            login_timestamp,
            logout_timestamp: None,
        }
    }

    /// Returns a copy closed at `logout_timestamp`.
    pub fn closed_at(mut self, logout_timestamp: EpochMillis) -> Self {
        self.logout_timestamp = Some(logout_timestamp);
        self
    }

    /// A session without a logout time is live.
    pub fn is_live(&self) -> bool {
        self.logout_timestamp.is_none()
    }

    /// Elapsed milliseconds, measured against `now_ms` while live.
    ///
    /// May be negative for malformed records; callers decide whether to clamp
    /// or to display a sentinel.
    pub fn elapsed_ms(&self, now_ms: EpochMillis) -> i64 {
        let end = self.logout_timestamp.unwrap_or(now_ms);
        end.saturating_sub(self.login_timestamp)
    }

    /// Checks the timestamps for impossible values.
    pub fn validate(&self) -> Result<()> {
        if self.login_timestamp < 0 {
            return Err(RegistroError::malformed(
                &self.session_id,
                format!("negative login timestamp {}", self.login_timestamp),
            ));
        }
        if let Some(logout) = self.logout_timestamp {
            if logout < self.login_timestamp {
                return Err(RegistroError::malformed(
                    &self.session_id,
                    format!(
                        "logout {} precedes login {}",
                        logout, self.login_timestamp
                    ),
                ));
            }
        }
        Ok(())
    }
}

/// A liveness signal emitted while a student works.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    pub student_id: String,
    pub timestamp: EpochMillis,
    /// Owning teacher when the producer knows it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<String>,
}

impl ActivityRecord {
    pub fn new(student_id: impl Into<String>, timestamp: EpochMillis) -> Self {
        Self {
            student_id: student_id.into(),
            timestamp,
            teacher_id: None,
        }
    }

    pub fn with_teacher(mut self, teacher_id: impl Into<String>) -> Self {
        self.teacher_id = Some(teacher_id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elapsed_closed_and_live() {
        let closed = SessionRecord::open("1", "anna", "t", 1_000).closed_at(66_000);
        assert_eq!(closed.elapsed_ms(999_999), 65_000);

        let live = SessionRecord::open("2", "anna", "t", 1_000);
        assert!(live.is_live());
        assert_eq!(live.elapsed_ms(4_000), 3_000);
    }

    #[test]
    fn test_validate_rejects_logout_before_login() {
        let record = SessionRecord::open("1", "anna", "t", 10_000).closed_at(5_000);
        let err = record.validate().unwrap_err();
        assert!(err.is_malformed());
        assert_eq!(record.elapsed_ms(0), -5_000);
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let record = SessionRecord::open("s1", "anna", "t1", 42);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["sessionId"], "s1");
        assert_eq!(json["loginTimestamp"], 42);
        assert!(json.get("logoutTimestamp").is_none());
    }
}
