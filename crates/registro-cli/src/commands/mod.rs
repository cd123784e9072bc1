//! Subcommand implementations.

pub mod delete;
pub mod demo;
pub mod record;
mod render;
pub mod report;

use anyhow::{Context as _, Result};
use registro_application::{Clock, SystemClock, UpdateChannel};
use registro_core::config::ReportConfig;
use registro_core::session::SessionStore;
use registro_infrastructure::{ConfigService, InMemorySessionStore, TomlSessionStore};
use std::path::PathBuf;
use std::sync::Arc;

/// Everything a subcommand needs: settings, a store, a clock and a channel.
pub struct Context {
    pub config: ReportConfig,
    pub store: Arc<dyn SessionStore>,
    pub clock: Arc<dyn Clock>,
    pub channel: UpdateChannel,
}

impl Context {
    /// Context backed by the TOML sessions file.
    pub fn load(store: Option<PathBuf>, config: Option<PathBuf>) -> Result<Self> {
        let store = match store {
            Some(path) => TomlSessionStore::new(path),
            None => TomlSessionStore::default_location()?,
        };
        tracing::debug!(path = %store.path().display(), "using sessions file");
        Self::build(Arc::new(store), config)
    }

    /// Context backed by a fresh in-memory store.
    pub fn in_memory(config: Option<PathBuf>) -> Result<Self> {
        Self::build(Arc::new(InMemorySessionStore::new()), config)
    }

    fn build(store: Arc<dyn SessionStore>, config: Option<PathBuf>) -> Result<Self> {
        let service = match config {
            Some(path) => ConfigService::new(path),
            None => ConfigService::default_location()?,
        };
        let config = service
            .get_config()
            .with_context(|| format!("Failed to load {}", service.path().display()))?;
        let clock = SystemClock::from_config(&config)?;

        Ok(Self {
            channel: UpdateChannel::from_config(&config),
            config,
            store,
            clock: Arc::new(clock),
        })
    }
}
