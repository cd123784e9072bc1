mod atomic_toml;

pub use atomic_toml::{AtomicTomlDocument, AtomicTomlError};
