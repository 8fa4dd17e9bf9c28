//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use vcc_test_recorder::prelude::*;
//! ```

// Core
pub use crate::core::clock::{Clock, FixedClock, SystemClock};
pub use crate::core::config::{Config, StorageBackendKind, UnreviewedPolicy};
pub use crate::core::errors::{Result, VccError};

// Catalog
pub use crate::catalog::{CarRole, TestItem};

// Results
pub use crate::results::aggregate::summarize;
pub use crate::results::model::{Report, ReportStats, SystemSummary, TestResult, Verdict};

// Store
pub use crate::store::backend::{JsonFileBackend, KvBackend, MemoryBackend};
#[cfg(feature = "sqlite")]
pub use crate::store::sqlite::SqliteBackend;
pub use crate::store::reports::{ReportKey, ReportStore, StoredReport};

// Session
pub use crate::session::controller::{RunPhase, RunSnapshot, TestRunController};
pub use crate::session::status::{LineKind, StatusLine, StatusLog};

// Logging
pub use crate::logger::ActivityLog;
pub use crate::logger::jsonl::{JsonlConfig, JsonlWriter};
