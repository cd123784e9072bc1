//! TOML-file `SessionStore`.
//!
//! File layout:
//! ```text
//! <data_dir>/registro/
//! ├── sessions.toml   # SessionsDocument: sessions + activities
//! └── sessions.lock   # fs2 lock target for updates, kept between runs
//! ```
//!
//! Every mutation is a locked read-modify-write of the whole document, so a
//! bulk delete either lands completely or not at all. File I/O runs on the
//! blocking pool.

use crate::dto::SessionsDocument;
use crate::paths::RegistroPaths;
use crate::storage::{AtomicTomlDocument, AtomicTomlError};
use async_trait::async_trait;
use registro_core::error::{RegistroError, Result};
use registro_core::session::{ActivityRecord, EpochMillis, SessionRecord, SessionStore};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

pub struct TomlSessionStore {
    document: AtomicTomlDocument<SessionsDocument>,
}

impl TomlSessionStore {
    /// Opens the store at the default location (`<data_dir>/registro/sessions.toml`).
    pub fn default_location() -> Result<Self> {
        let path = RegistroPaths::sessions_file()
            .map_err(|e| RegistroError::config(format!("Failed to resolve data directory: {}", e)))?;
        Ok(Self::new(path))
    }

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            document: AtomicTomlDocument::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.document.path()
    }

    async fn read<R, F>(&self, f: F) -> Result<R>
    where
        R: Send + 'static,
        F: FnOnce(&SessionsDocument) -> R + Send + 'static,
    {
        let document = self.document.clone();
        tokio::task::spawn_blocking(move || -> Result<R> {
            let loaded = document.load()?.unwrap_or_default();
            if loaded.version > crate::dto::DOCUMENT_VERSION {
                tracing::warn!(version = loaded.version, "sessions file written by a newer version");
            }
            Ok(f(&loaded))
        })
        .await
        .map_err(|e| RegistroError::internal(format!("blocking task failed: {}", e)))?
    }

    async fn write<R, F>(&self, f: F) -> Result<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut SessionsDocument) -> Result<R> + Send + 'static,
    {
        let document = self.document.clone();
        tokio::task::spawn_blocking(move || -> Result<R> {
            Ok(document.update(|doc| f(doc).map_err(AtomicTomlError::Rejected))?)
        })
        .await
        .map_err(|e| RegistroError::internal(format!("blocking task failed: {}", e)))?
    }
}

#[async_trait]
impl SessionStore for TomlSessionStore {
    async fn fetch_sessions_for_owner(&self, owner_id: &str) -> Result<Vec<SessionRecord>> {
        let owner_id = owner_id.to_string();
        let sessions = self
            .read(move |doc| doc.sessions_for_owner(&owner_id))
            .await?;
        for session in &sessions {
            if let Err(e) = session.validate() {
                tracing::warn!(error = %e, "malformed session in store");
            }
        }
        Ok(sessions)
    }

    async fn delete_sessions_and_activities(&self, session_ids: &BTreeSet<String>) -> Result<()> {
        let ids = session_ids.clone();
        let removed = self.write(move |doc| Ok(doc.delete_sessions(&ids))).await?;
        tracing::info!(path = %self.path().display(), removed, "deleted sessions");
        Ok(())
    }

    async fn insert_session(&self, session: &SessionRecord) -> Result<()> {
        let session = session.clone();
        self.write(move |doc| {
            doc.upsert_session(&session);
            Ok(())
        })
        .await
    }

    async fn close_session(
        &self,
        session_id: &str,
        logout_timestamp: EpochMillis,
    ) -> Result<SessionRecord> {
        let session_id = session_id.to_string();
        self.write(move |doc| doc.close_session(&session_id, logout_timestamp))
            .await
    }

    async fn record_activity(&self, activity: &ActivityRecord) -> Result<()> {
        let activity = activity.clone();
        self.write(move |doc| {
            doc.record_activity(&activity);
            Ok(())
        })
        .await
    }

    async fn activities_for_student(&self, student_id: &str) -> Result<Vec<ActivityRecord>> {
        let student_id = student_id.to_string();
        self.read(move |doc| doc.activities_for_student(&student_id))
            .await
    }
}
