//! VCC-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, VccError>;

/// Top-level error type for the VCC test recorder.
#[derive(Debug, Error)]
pub enum VccError {
    #[error("[VCC-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[VCC-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[VCC-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[VCC-1101] validation failed for {field}: {details}")]
    Validation {
        field: &'static str,
        details: String,
    },

    #[error("[VCC-2001] unknown test item id {id}")]
    UnknownTestItem { id: u32 },

    #[error("[VCC-2002] {operation} is not allowed while the run is {phase}")]
    InvalidPhase {
        operation: &'static str,
        phase: &'static str,
    },

    #[error("[VCC-2003] no test results available; run tests first")]
    EmptyResultSet,

    #[error("[VCC-2004] report not found: {key}")]
    ReportNotFound { key: String },

    #[error("[VCC-2101] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[VCC-3001] storage failure in {context}: {details}")]
    Storage {
        context: &'static str,
        details: String,
    },

    #[error("[VCC-3002] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl VccError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "VCC-1001",
            Self::MissingConfig { .. } => "VCC-1002",
            Self::ConfigParse { .. } => "VCC-1003",
            Self::Validation { .. } => "VCC-1101",
            Self::UnknownTestItem { .. } => "VCC-2001",
            Self::InvalidPhase { .. } => "VCC-2002",
            Self::EmptyResultSet => "VCC-2003",
            Self::ReportNotFound { .. } => "VCC-2004",
            Self::Serialization { .. } => "VCC-2101",
            Self::Storage { .. } => "VCC-3001",
            Self::Io { .. } => "VCC-3002",
        }
    }

    /// Whether retrying might resolve the failure.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::Storage { .. })
    }

    /// Whether the failure came from operator input rather than the environment.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::UnknownTestItem { .. }
                | Self::InvalidPhase { .. }
                | Self::EmptyResultSet
                | Self::ReportNotFound { .. }
        )
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Convenience constructor for a missing or blank setup field.
    #[must_use]
    pub fn missing_field(field: &'static str) -> Self {
        Self::Validation {
            field,
            details: "a value is required".to_string(),
        }
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for VccError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Storage {
            context: "rusqlite",
            details: value.to_string(),
        }
    }
}

impl From<serde_json::Error> for VccError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for VccError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}
