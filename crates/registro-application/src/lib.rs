//! Application layer for Registro.
//!
//! Coordinates the domain types of `registro-core` with a session store, an
//! update channel and timers to run a live access report.

pub mod bus;
pub mod clock;
pub mod recorder;
pub mod view;

#[cfg(test)]
mod test_support;

pub use bus::{UpdateChannel, UpdateSubscription};
pub use clock::{AnchoredClock, Clock, SystemClock};
pub use recorder::AttendanceRecorder;
pub use view::{AccessReportView, PendingDelete, ReportSnapshot};
