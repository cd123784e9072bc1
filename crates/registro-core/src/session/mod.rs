//! Session domain module.
//!
//! # Module Structure
//!
//! - `model`: Session and activity records (`SessionRecord`, `ActivityRecord`)
//! - `event`: Notifications exchanged between views (`UpdateEvent`)
//! - `repository`: Store trait for session persistence (`SessionStore`)

mod event;
mod model;
mod repository;

// Re-export public API
pub use event::{UpdateEvent, UpdateKind};
pub use model::{ActivityRecord, EpochMillis, SessionRecord};
pub use repository::{SessionStore, sort_by_recency};
