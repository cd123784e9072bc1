//! Path management for Registro files.
//!
//! Resolved with the `dirs` crate so each platform gets its conventional
//! locations.
//!
//! ```text
//! ~/.config/registro/          # Config directory
//! └── config.toml              # ReportConfig
//!
//! ~/.local/share/registro/     # Data directory
//! └── sessions.toml            # TomlSessionStore document
//! ```

use std::path::PathBuf;
use thiserror::Error;

const APP_DIR: &str = "registro";

/// Errors that can occur during path resolution.
#[derive(Debug, Error)]
pub enum PathError {
    #[error("Cannot determine the {0} directory for this platform")]
    DirNotFound(&'static str),
}

pub struct RegistroPaths;

impl RegistroPaths {
    /// Returns the Registro configuration directory (e.g. `~/.config/registro/`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::DirNotFound("config"))
    }

    /// Returns the Registro data directory (e.g. `~/.local/share/registro/`).
    pub fn data_dir() -> Result<PathBuf, PathError> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::DirNotFound("data"))
    }

    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn sessions_file() -> Result<PathBuf, PathError> {
        Ok(Self::data_dir()?.join("sessions.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_files_live_under_app_dirs() {
        // Headless CI boxes may lack a home directory; only check when resolvable.
        if let (Ok(dir), Ok(file)) = (RegistroPaths::config_dir(), RegistroPaths::config_file()) {
            assert!(dir.ends_with(APP_DIR));
            assert_eq!(file, dir.join("config.toml"));
        }
        if let Ok(file) = RegistroPaths::sessions_file() {
            assert!(file.ends_with("registro/sessions.toml"));
        }
    }
}
