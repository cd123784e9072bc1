use crate::error::{RegistroError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Runtime settings of the access report.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ReportConfig {
    /// Period of the live-duration tick
    pub tick_interval_ms: u64,
    /// How long a burst flag stays raised after the last activity
    pub burst_duration_ms: u64,
    /// Buffered notifications per subscriber before it starts lagging
    pub channel_capacity: usize,
    /// Topic name the views broadcast on
    pub topic: String,
    /// Offset used for day buckets; `None` means the local offset
    pub utc_offset_minutes: Option<i32>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1_000,
            burst_duration_ms: 2_000,
            channel_capacity: 256,
            topic: "sessions".to_string(),
            utc_offset_minutes: None,
        }
    }
}

impl ReportConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn burst_duration(&self) -> Duration {
        Duration::from_millis(self.burst_duration_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            return Err(RegistroError::config("tick_interval_ms must be positive"));
        }
        if self.burst_duration_ms == 0 {
            return Err(RegistroError::config("burst_duration_ms must be positive"));
        }
        if self.channel_capacity == 0 {
            return Err(RegistroError::config("channel_capacity must be positive"));
        }
        if self.topic.trim().is_empty() {
            return Err(RegistroError::config("topic must not be empty"));
        }
        if let Some(offset) = self.utc_offset_minutes {
            if offset.abs() >= 24 * 60 {
                return Err(RegistroError::config(format!(
                    "utc_offset_minutes out of range: {}",
                    offset
                )));
            }
        }
        Ok(())
    }
}
