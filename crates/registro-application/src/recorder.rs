//! Producer side of the update channel.
//!
//! `AttendanceRecorder` persists logins, logouts and activities, then
//! broadcasts them so every open access report can reconcile. Persisting
//! first means a view that reloads never misses a notified record.

use crate::bus::UpdateChannel;
use crate::clock::Clock;
use registro_core::error::Result;
use registro_core::session::{ActivityRecord, SessionRecord, SessionStore, UpdateEvent};
use std::sync::Arc;
use uuid::Uuid;

pub struct AttendanceRecorder {
    store: Arc<dyn SessionStore>,
    channel: UpdateChannel,
    clock: Arc<dyn Clock>,
}

impl AttendanceRecorder {
    pub fn new(store: Arc<dyn SessionStore>, channel: UpdateChannel, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            channel,
            clock,
        }
    }

    /// Opens a session for a student and announces it.
    pub async fn login(&self, student_id: &str, teacher_id: &str) -> Result<SessionRecord> {
        let session = SessionRecord::open(
            Uuid::new_v4().to_string(),
            student_id,
            teacher_id,
            self.clock.now_ms(),
        );
        self.store.insert_session(&session).await?;
        tracing::info!(session_id = %session.session_id, student_id, teacher_id, "student logged in");

        self.channel.publish(UpdateEvent::Login {
            session: session.clone(),
        });
        Ok(session)
    }

    /// Closes a session and announces it.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the store has no such session and
    /// `AlreadyClosed` if it was logged out before. Nothing is published
    /// in either case.
    pub async fn logout(&self, session_id: &str) -> Result<SessionRecord> {
        let session = self
            .store
            .close_session(session_id, self.clock.now_ms())
            .await?;
        tracing::info!(session_id, student_id = %session.student_id, "student logged out");

        self.channel.publish(UpdateEvent::Logout {
            session: session.clone(),
        });
        Ok(session)
    }

    /// Records a student action and announces it.
    pub async fn record_activity(
        &self,
        student_id: &str,
        teacher_id: Option<&str>,
    ) -> Result<ActivityRecord> {
        let mut activity = ActivityRecord::new(student_id, self.clock.now_ms());
        if let Some(teacher_id) = teacher_id {
            activity = activity.with_teacher(teacher_id);
        }
        self.store.record_activity(&activity).await?;
        tracing::debug!(student_id, "activity recorded");

        self.channel.publish(UpdateEvent::NewActivity {
            activity: activity.clone(),
        });
        Ok(activity)
    }
}
