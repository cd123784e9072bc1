//! Error types for the Registro application.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire Registro workspace.
///
/// Store-layer failures surface as `Fetch` or `Delete` so the view layer can
/// offer a retry; `MalformedRecord` is reported but never fatal.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum RegistroError {
    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound { entity_type: String, id: String },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Loading the sessions of an owner failed
    #[error("Failed to fetch sessions for '{owner_id}': {message}")]
    Fetch { owner_id: String, message: String },

    /// Deleting sessions failed; nothing was removed locally
    #[error("Failed to delete {} session(s): {message}", .session_ids.len())]
    Delete {
        session_ids: Vec<String>,
        message: String,
    },

    /// A record with impossible timestamps
    #[error("Malformed session record '{session_id}': {reason}")]
    MalformedRecord { session_id: String, reason: String },

    /// Logout of a session that already has a logout time
    #[error("Session '{session_id}' already closed at {logout_timestamp}")]
    AlreadyClosed {
        session_id: String,
        logout_timestamp: i64,
    },

    /// File locking error
    #[error("Lock error: {0}")]
    Lock(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RegistroError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.to_string(),
            id: id.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a Fetch error for the given owner
    pub fn fetch(owner_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            owner_id: owner_id.into(),
            message: message.into(),
        }
    }

    /// Creates a Delete error for the given ids
    pub fn delete<I, S>(session_ids: I, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Delete {
            session_ids: session_ids.into_iter().map(Into::into).collect(),
            message: message.into(),
        }
    }

    /// Creates a MalformedRecord error
    pub fn malformed(session_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            session_id: session_id.into(),
            reason: reason.into(),
        }
    }

    /// Creates an AlreadyClosed error
    pub fn already_closed(session_id: impl Into<String>, logout_timestamp: i64) -> Self {
        Self::AlreadyClosed {
            session_id: session_id.into(),
            logout_timestamp,
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a Fetch error
    pub fn is_fetch(&self) -> bool {
        matches!(self, Self::Fetch { .. })
    }

    /// Check if this is a Delete error
    pub fn is_delete(&self) -> bool {
        matches!(self, Self::Delete { .. })
    }

    /// Check if this is a MalformedRecord error
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedRecord { .. })
    }

    /// Check if this is an AlreadyClosed error
    pub fn is_already_closed(&self) -> bool {
        matches!(self, Self::AlreadyClosed { .. })
    }

    /// Check if this is a config error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Whether the failure can be retried by the user.
    ///
    /// Store-layer failures are local-recoverable; configuration and data
    /// errors need a fix first.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Fetch { .. } | Self::Delete { .. } | Self::Io { .. } | Self::Lock(_)
        )
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for RegistroError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for RegistroError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for RegistroError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for RegistroError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, RegistroError>`.
pub type Result<T> = std::result::Result<T, RegistroError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_error_message_counts_ids() {
        let err = RegistroError::delete(["a", "b"], "disk full");
        assert_eq!(err.to_string(), "Failed to delete 2 session(s): disk full");
        assert!(err.is_delete());
        assert!(err.is_retryable());
    }

    #[test]
    fn test_malformed_is_not_retryable() {
        let err = RegistroError::malformed("s-1", "logout precedes login");
        assert!(err.is_malformed());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_io_conversion_keeps_kind() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: RegistroError = io.into();
        assert!(err.to_string().contains("NotFound"));
    }
}
