use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

use super::{ActivityRecord, SessionRecord};

/// Notifications broadcast between open views of the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UpdateEvent {
    /// A student logged in; `session` is live.
    Login { session: SessionRecord },
    /// A student logged out; `session` carries the logout time.
    Logout { session: SessionRecord },
    /// A student did something.
    NewActivity { activity: ActivityRecord },
}

/// Discriminant of an [`UpdateEvent`], for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum UpdateKind {
    Login,
    Logout,
    NewActivity,
}

impl UpdateEvent {
    pub fn kind(&self) -> UpdateKind {
        match self {
            Self::Login { .. } => UpdateKind::Login,
            Self::Logout { .. } => UpdateKind::Logout,
            Self::NewActivity { .. } => UpdateKind::NewActivity,
        }
    }

    /// Student the notification is about.
    pub fn student_id(&self) -> &str {
        match self {
            Self::Login { session } | Self::Logout { session } => &session.student_id,
            Self::NewActivity { activity } => &activity.student_id,
        }
    }
}
