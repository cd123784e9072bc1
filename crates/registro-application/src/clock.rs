//! Wall-clock sources for day buckets and live durations.

use chrono::{DateTime, FixedOffset, Local, Utc};
use registro_core::config::ReportConfig;
use registro_core::error::{RegistroError, Result};
use registro_core::session::EpochMillis;
use tokio::time::Instant;

/// Source of the current date and time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;

    fn now_ms(&self) -> EpochMillis {
        self.now().timestamp_millis()
    }
}

/// The system clock, in the local offset or a fixed one.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock {
    offset: Option<FixedOffset>,
}

impl SystemClock {
    pub fn local() -> Self {
        Self { offset: None }
    }

    pub fn with_offset(offset: FixedOffset) -> Self {
        Self {
            offset: Some(offset),
        }
    }

    /// Uses `utc_offset_minutes` from the config when set.
    pub fn from_config(config: &ReportConfig) -> Result<Self> {
        match config.utc_offset_minutes {
            None => Ok(Self::local()),
            Some(minutes) => FixedOffset::east_opt(minutes * 60)
                .map(Self::with_offset)
                .ok_or_else(|| {
                    RegistroError::config(format!("invalid utc offset: {} minutes", minutes))
                }),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        match self.offset {
            Some(offset) => Utc::now().with_timezone(&offset),
            None => Local::now().fixed_offset(),
        }
    }
}

/// A clock pinned to a wall time that advances with the tokio clock.
///
/// Under a paused tokio runtime it moves only when tokio time does, which
/// keeps timer-driven code deterministic.
#[derive(Debug, Clone)]
pub struct AnchoredClock {
    anchor: DateTime<FixedOffset>,
    started: Instant,
}

impl AnchoredClock {
    pub fn new(anchor: DateTime<FixedOffset>) -> Self {
        Self {
            anchor,
            started: Instant::now(),
        }
    }
}

impl Clock for AnchoredClock {
    fn now(&self) -> DateTime<FixedOffset> {
        let elapsed = chrono::Duration::from_std(self.started.elapsed())
            .unwrap_or_else(|_| chrono::Duration::zero());
        self.anchor + elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_anchored_clock_follows_tokio_time() {
        let anchor = FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2026, 10, 17, 8, 0, 0)
            .unwrap();
        let clock = AnchoredClock::new(anchor);

        tokio::time::advance(Duration::from_millis(2_500)).await;
        assert_eq!(clock.now_ms() - anchor.timestamp_millis(), 2_500);
    }

    #[test]
    fn test_from_config_fixed_offset() {
        let config = ReportConfig {
            utc_offset_minutes: Some(120),
            ..ReportConfig::default()
        };
        let clock = SystemClock::from_config(&config).unwrap();
        assert_eq!(clock.now().offset().local_minus_utc(), 7_200);
    }
}
