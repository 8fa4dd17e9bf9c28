//! Configuration system: TOML file + env var overrides + smart defaults.

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{Result, VccError};

/// Full recorder configuration model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub checklist: ChecklistConfig,
    pub status: StatusConfig,
    pub narration: NarrationConfig,
    pub clock: ClockConfig,
    pub paths: PathsConfig,
}

/// Which key-value medium holds the report collection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackendKind {
    /// Single JSON document on disk.
    Json,
    /// SQLite `kv_store` table (requires the `sqlite` feature).
    Sqlite,
    /// Process-local; nothing survives exit.
    Memory,
}

impl StorageBackendKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Sqlite => "sqlite",
            Self::Memory => "memory",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "sqlite" => Some(Self::Sqlite),
            "memory" => Some(Self::Memory),
            _ => None,
        }
    }
}

/// What happens to checklist items the operator never marked.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnreviewedPolicy {
    /// Unmarked items are saved as PASS with an empty reason.
    #[default]
    DefaultPass,
    /// Saving is refused until every item carries a verdict.
    RequireReview,
}

impl UnreviewedPolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DefaultPass => "default_pass",
            Self::RequireReview => "require_review",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "default_pass" => Some(Self::DefaultPass),
            "require_review" => Some(Self::RequireReview),
            _ => None,
        }
    }
}

/// Report persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackendKind,
    pub json_path: PathBuf,
    pub sqlite_path: PathBuf,
}

/// Checklist entry behavior.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct ChecklistConfig {
    pub unreviewed_policy: UnreviewedPolicy,
}

/// Status log sizing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StatusConfig {
    /// Oldest lines are evicted past this count; `0` keeps everything.
    pub max_lines: usize,
}

/// Narration playback pacing used by the terminal front end.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NarrationConfig {
    /// Multiplier on each step's pacing hint; `0.0` plays instantly.
    pub pace_scale: f64,
}

/// Local time used for `testTime` capture.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ClockConfig {
    pub utc_offset_minutes: i32,
    pub zone_label: String,
}

/// Filesystem paths used by vcc.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    pub config_file: PathBuf,
    pub activity_log: PathBuf,
}

fn home_dir() -> PathBuf {
    env::var_os("HOME").map_or_else(
        || {
            eprintln!("[VCC-CONFIG] WARNING: HOME not set, falling back to /tmp for data paths");
            PathBuf::from("/tmp")
        },
        PathBuf::from,
    )
}

fn data_dir() -> PathBuf {
    home_dir().join(".local").join("share").join("vcc")
}

impl Default for StorageConfig {
    fn default() -> Self {
        let data = data_dir();
        Self {
            backend: StorageBackendKind::Json,
            json_path: data.join("reports.json"),
            sqlite_path: data.join("reports.sqlite3"),
        }
    }
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self { max_lines: 500 }
    }
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self { pace_scale: 1.0 }
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 330,
            zone_label: "IST".to_string(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            config_file: home_dir().join(".config").join("vcc").join("config.toml"),
            activity_log: data_dir().join("activity.jsonl"),
        }
    }
}

impl Config {
    /// Default configuration path.
    #[must_use]
    pub fn default_path() -> PathBuf {
        PathsConfig::default().config_file
    }

    /// Load config from default or explicit path, then apply env overrides.
    ///
    /// Missing config file is not an error when loading from default path; defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path_buf = path.map_or_else(Self::default_path, Path::to_path_buf);
        let is_explicit_path = path.is_some();

        let mut cfg = if path_buf.exists() {
            let raw = fs::read_to_string(&path_buf).map_err(|source| VccError::Io {
                path: path_buf.clone(),
                source,
            })?;
            let parsed: Self = toml::from_str(&raw)?;
            parsed
        } else if is_explicit_path {
            return Err(VccError::MissingConfig { path: path_buf });
        } else {
            Self::default()
        };

        cfg.paths.config_file = path_buf;
        cfg.apply_env_overrides_from(env_var)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Deterministic hash of the effective config for logging.
    ///
    /// FNV-1a over the canonical JSON form, stable across processes.
    pub fn stable_hash(&self) -> Result<String> {
        let canonical = serde_json::to_string(self)?;
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in canonical.as_bytes() {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        Ok(format!("{hash:016x}"))
    }

    fn apply_env_overrides_from<F>(&mut self, mut lookup: F) -> Result<()>
    where
        F: FnMut(&str) -> Option<String>,
    {
        // storage
        if let Some(raw) = lookup("VCC_STORAGE_BACKEND") {
            self.storage.backend =
                StorageBackendKind::parse(&raw).ok_or_else(|| VccError::ConfigParse {
                    context: "env",
                    details: format!("VCC_STORAGE_BACKEND={raw:?}: expected json|sqlite|memory"),
                })?;
        }
        if let Some(raw) = lookup("VCC_STORAGE_JSON_PATH") {
            self.storage.json_path = PathBuf::from(raw);
        }
        if let Some(raw) = lookup("VCC_STORAGE_SQLITE_PATH") {
            self.storage.sqlite_path = PathBuf::from(raw);
        }
        // checklist
        if let Some(raw) = lookup("VCC_CHECKLIST_UNREVIEWED_POLICY") {
            self.checklist.unreviewed_policy =
                UnreviewedPolicy::parse(&raw).ok_or_else(|| VccError::ConfigParse {
                    context: "env",
                    details: format!(
                        "VCC_CHECKLIST_UNREVIEWED_POLICY={raw:?}: expected default_pass|require_review"
                    ),
                })?;
        }
        // status
        if let Some(raw) = lookup("VCC_STATUS_MAX_LINES") {
            self.status.max_lines = parse_env("VCC_STATUS_MAX_LINES", &raw)?;
        }
        // narration
        if let Some(raw) = lookup("VCC_NARRATION_PACE_SCALE") {
            self.narration.pace_scale = parse_env("VCC_NARRATION_PACE_SCALE", &raw)?;
        }
        // clock
        if let Some(raw) = lookup("VCC_CLOCK_UTC_OFFSET_MINUTES") {
            self.clock.utc_offset_minutes = parse_env("VCC_CLOCK_UTC_OFFSET_MINUTES", &raw)?;
        }
        if let Some(raw) = lookup("VCC_CLOCK_ZONE_LABEL") {
            self.clock.zone_label = raw;
        }
        // paths
        if let Some(raw) = lookup("VCC_PATHS_ACTIVITY_LOG") {
            self.paths.activity_log = PathBuf::from(raw);
        }
        Ok(())
    }

    /// Reject values the rest of the crate cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=10.0).contains(&self.narration.pace_scale) {
            return Err(VccError::InvalidConfig {
                details: format!(
                    "narration.pace_scale must be in [0, 10], got {}",
                    self.narration.pace_scale
                ),
            });
        }

        // chrono accepts offsets strictly inside one day; real zones span -12:00..=+14:00.
        if !(-720..=840).contains(&self.clock.utc_offset_minutes) {
            return Err(VccError::InvalidConfig {
                details: format!(
                    "clock.utc_offset_minutes must be in [-720, 840], got {}",
                    self.clock.utc_offset_minutes
                ),
            });
        }

        let path = match self.storage.backend {
            StorageBackendKind::Json => Some(("storage.json_path", &self.storage.json_path)),
            StorageBackendKind::Sqlite => Some(("storage.sqlite_path", &self.storage.sqlite_path)),
            StorageBackendKind::Memory => None,
        };
        if let Some((name, path)) = path
            && path.as_os_str().is_empty()
        {
            return Err(VccError::InvalidConfig {
                details: format!(
                    "{name} must be set for the {} backend",
                    self.storage.backend.as_str()
                ),
            });
        }

        if self.storage.backend == StorageBackendKind::Sqlite && !cfg!(feature = "sqlite") {
            return Err(VccError::InvalidConfig {
                details: "storage.backend = \"sqlite\" requires the sqlite feature".to_string(),
            });
        }

        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|raw| !raw.trim().is_empty())
}

fn parse_env<T>(name: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|error| VccError::ConfigParse {
        context: "env",
        details: format!("{name}={raw:?}: {error}"),
    })
}
