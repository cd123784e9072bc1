//! Domain layer of Registro: session records, the access report, live
//! presence and the selection state machine.

pub mod config;
pub mod error;
pub mod presence;
pub mod report;
pub mod selection;
pub mod session;

// Re-export common error type
pub use error::RegistroError;
