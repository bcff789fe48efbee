//! Configuration for Versed.
//!
//! Maps directly to `versed.toml`. Every field has a serde default so a
//! partial (or empty) file is valid.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VersedError};

/// Longest interval `scheduling.max_interval_days` may ask for (100 years).
pub const MAX_INTERVAL_DAYS_LIMIT: u32 = 36_500;

/// Top-level configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VersedConfig {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Spaced-repetition interval tuning.
    #[serde(default)]
    pub scheduling: SchedulingConfig,
    /// Persistence / save settings.
    #[serde(default)]
    pub persistence: PersistenceConfig,
    /// Example content seeding.
    #[serde(default)]
    pub seed: SeedConfig,
}

impl VersedConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `VersedError::Config` if the TOML is invalid or fails
    /// [`validate`](Self::validate).
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(toml_str).map_err(|e| VersedError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Check cross-field constraints that serde cannot express.
    ///
    /// # Errors
    /// Returns `VersedError::Config` describing the first violated constraint.
    pub fn validate(&self) -> Result<()> {
        let s = &self.scheduling;
        if !(s.growth_factor.is_finite() && s.growth_factor > 1.0) {
            return Err(VersedError::Config(format!(
                "scheduling.growth_factor must be greater than 1.0, got {}",
                s.growth_factor
            )));
        }
        if !(s.initial_interval_hours.is_finite() && s.initial_interval_hours > 0.0) {
            return Err(VersedError::Config(format!(
                "scheduling.initial_interval_hours must be positive, got {}",
                s.initial_interval_hours
            )));
        }
        if s.max_interval_days > MAX_INTERVAL_DAYS_LIMIT {
            return Err(VersedError::Config(format!(
                "scheduling.max_interval_days must be at most {MAX_INTERVAL_DAYS_LIMIT}, got {}",
                s.max_interval_days
            )));
        }
        if f64::from(s.max_interval_days) * 24.0 < s.initial_interval_hours {
            return Err(VersedError::Config(format!(
                "scheduling.max_interval_days ({}) is shorter than the initial interval ({}h)",
                s.max_interval_days, s.initial_interval_hours
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// General system settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Emit logs as JSON lines instead of human-readable text.
    #[serde(default)]
    pub json_logs: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

/// Spaced-repetition interval settings.
///
/// A passed paragraph's interval becomes
/// `clamp(max(initial, interval × growth_factor), max)`; a retried one
/// resets to zero and is due again after `retry_delay_minutes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulingConfig {
    /// Interval after the first `good`, in hours.
    #[serde(default = "default_initial_interval_hours")]
    pub initial_interval_hours: f64,
    /// Multiplier applied to the interval on every further `good`.
    #[serde(default = "default_growth_factor")]
    pub growth_factor: f64,
    /// Upper bound on the interval, in days.
    #[serde(default = "default_max_interval_days")]
    pub max_interval_days: u32,
    /// Delay before a retried paragraph is due again, in minutes.
    #[serde(default)]
    pub retry_delay_minutes: u32,
}

impl SchedulingConfig {
    /// Initial interval as a [`Duration`].
    #[must_use]
    pub fn initial_interval(&self) -> Duration {
        hours_to_duration(self.initial_interval_hours)
    }

    /// Maximum interval as a [`Duration`].
    #[must_use]
    pub fn max_interval(&self) -> Duration {
        Duration::days(i64::from(self.max_interval_days))
    }

    /// Retry delay as a [`Duration`].
    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        Duration::minutes(i64::from(self.retry_delay_minutes))
    }
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            initial_interval_hours: 24.0,
            growth_factor: 2.0,
            max_interval_days: 365,
            retry_delay_minutes: 0,
        }
    }
}

/// Persistence / save configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Use WAL mode for the SQLite journal.
    #[serde(default = "default_true")]
    pub wal_mode: bool,
    /// Number of rotating backups to keep.
    #[serde(default = "default_backup_count")]
    pub backup_count: u32,
    /// Detect save corruption via checksums.
    #[serde(default = "default_true")]
    pub checksum_enabled: bool,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            wal_mode: true,
            backup_count: 3,
            checksum_enabled: true,
        }
    }
}

/// Example content seeding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    /// Insert the bundled example passages on first launch.
    #[serde(default = "default_true")]
    pub examples_enabled: bool,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            examples_enabled: true,
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn hours_to_duration(hours: f64) -> Duration {
    Duration::seconds((hours * 3600.0).round() as i64)
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_true() -> bool { true }
fn default_log_level() -> String { "info".to_string() }
fn default_initial_interval_hours() -> f64 { 24.0 }
fn default_growth_factor() -> f64 { 2.0 }
fn default_max_interval_days() -> u32 { 365 }
fn default_backup_count() -> u32 { 3 }
