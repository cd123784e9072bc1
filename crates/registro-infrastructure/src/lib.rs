//! Storage for Registro: session stores, configuration and paths.

pub mod config_service;
pub mod dto;
pub mod in_memory_session_store;
pub mod paths;
pub mod storage;
pub mod toml_session_store;

pub use crate::config_service::ConfigService;
pub use crate::in_memory_session_store::InMemorySessionStore;
pub use crate::paths::RegistroPaths;
pub use crate::toml_session_store::TomlSessionStore;
