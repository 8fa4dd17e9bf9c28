//! Injected time source for run timestamps.
//!
//! The controller never reads the wall clock directly; it asks a [`Clock`] so
//! tests can pin the capture time.

use chrono::{DateTime, FixedOffset, Utc};

use crate::core::config::ClockConfig;
use crate::core::errors::{Result, VccError};

/// Source of the local time used for `testTime` and default `testDate`.
pub trait Clock {
    /// Current local time.
    fn now(&self) -> DateTime<FixedOffset>;

    /// Short zone label appended to formatted times (e.g. `IST`).
    fn zone_label(&self) -> &str;
}

/// Wall clock shifted to a fixed UTC offset.
#[derive(Debug, Clone)]
pub struct SystemClock {
    offset: FixedOffset,
    label: String,
}

impl SystemClock {
    /// Build from the `[clock]` config section.
    pub fn from_config(cfg: &ClockConfig) -> Result<Self> {
        let offset = FixedOffset::east_opt(cfg.utc_offset_minutes * 60).ok_or_else(|| {
            VccError::InvalidConfig {
                details: format!(
                    "clock.utc_offset_minutes out of range: {}",
                    cfg.utc_offset_minutes
                ),
            }
        })?;
        Ok(Self {
            offset,
            label: cfg.zone_label.clone(),
        })
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }

    fn zone_label(&self) -> &str {
        &self.label
    }
}

/// Clock frozen at one instant.
#[derive(Debug, Clone)]
pub struct FixedClock {
    at: DateTime<FixedOffset>,
    label: String,
}

impl FixedClock {
    #[must_use]
    pub fn new(at: DateTime<FixedOffset>, label: impl Into<String>) -> Self {
        Self {
            at,
            label: label.into(),
        }
    }

    /// Parse an RFC 3339 instant; handy in tests.
    pub fn parse(rfc3339: &str, label: impl Into<String>) -> Result<Self> {
        let at = DateTime::parse_from_rfc3339(rfc3339).map_err(|error| VccError::Validation {
            field: "clock",
            details: format!("{rfc3339:?}: {error}"),
        })?;
        Ok(Self::new(at, label))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.at
    }

    fn zone_label(&self) -> &str {
        &self.label
    }
}

/// `hh:mm AM <label>`, the run's `testTime`.
pub fn format_test_time(clock: &dyn Clock) -> String {
    let time = clock.now().format("%I:%M %p").to_string();
    let label = clock.zone_label();
    if label.is_empty() {
        time
    } else {
        format!("{time} {label}")
    }
}

/// `YYYY-MM-DD` for the clock's local date.
pub fn format_test_date(clock: &dyn Clock) -> String {
    clock.now().format("%Y-%m-%d").to_string()
}
