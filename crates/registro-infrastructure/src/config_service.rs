//! Configuration service implementation.
//!
//! Loads the [`ReportConfig`] from `config.toml` (by default
//! `~/.config/registro/config.toml`) and caches it.

use crate::paths::RegistroPaths;
use crate::storage::AtomicTomlDocument;
use registro_core::config::ReportConfig;
use registro_core::error::{RegistroError, Result};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Configuration service that loads and caches the report configuration.
///
/// A missing or empty file yields the defaults. A file that does not parse
/// or fails validation is an error rather than a silent fallback.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    config: Arc<RwLock<Option<ReportConfig>>>,
}

impl ConfigService {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Service reading the platform config file.
    pub fn default_location() -> Result<Self> {
        let path = RegistroPaths::config_file()
            .map_err(|e| RegistroError::config(format!("Failed to resolve config directory: {}", e)))?;
        Ok(Self::new(path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the configuration, loading from file if not cached.
    pub fn get_config(&self) -> Result<ReportConfig> {
        {
            let read_lock = self.config.read().unwrap_or_else(|e| e.into_inner());
            if let Some(cached) = read_lock.as_ref() {
                return Ok(cached.clone());
            }
        }

        let loaded = self.load_config()?;
        let mut write_lock = self.config.write().unwrap_or_else(|e| e.into_inner());
        *write_lock = Some(loaded.clone());
        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut write_lock = self.config.write().unwrap_or_else(|e| e.into_inner());
        *write_lock = None;
    }

    fn load_config(&self) -> Result<ReportConfig> {
        let config = AtomicTomlDocument::<ReportConfig>::new(&self.path)
            .load()
            .map_err(|e| {
                RegistroError::config(format!("{}: {}", self.path.display(), e))
            })?;
        let config = match config {
            Some(config) => config,
            None => {
                tracing::debug!(path = %self.path.display(), "no config file, using defaults");
                ReportConfig::default()
            }
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::new(temp_dir.path().join("config.toml"));
        assert_eq!(service.get_config().unwrap(), ReportConfig::default());
    }

    #[test]
    fn test_partial_file_overrides_some_fields() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "tick_interval_ms = 250\ntopic = \"classe-3b\"\n").unwrap();

        let config = ConfigService::new(&path).get_config().unwrap();
        assert_eq!(config.tick_interval_ms, 250);
        assert_eq!(config.topic, "classe-3b");
        assert_eq!(config.burst_duration_ms, 2_000);
    }

    #[test]
    fn test_invalid_file_is_a_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");

        fs::write(&path, "tick_interval_ms = \"fast\"").unwrap();
        assert!(ConfigService::new(&path).get_config().unwrap_err().is_config());

        fs::write(&path, "burst_duration_ms = 0").unwrap();
        assert!(ConfigService::new(&path).get_config().unwrap_err().is_config());
    }

    #[test]
    fn test_cache_until_invalidated() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        let service = ConfigService::new(&path);
        assert_eq!(service.get_config().unwrap().tick_interval_ms, 1_000);

        fs::write(&path, "tick_interval_ms = 500").unwrap();
        assert_eq!(service.get_config().unwrap().tick_interval_ms, 1_000);

        service.invalidate_cache();
        assert_eq!(service.get_config().unwrap().tick_interval_ms, 500);
    }
}
