//! Report persistence: key-value backends and the report collection on top.

pub mod backend;
pub mod reports;
#[cfg(feature = "sqlite")]
pub mod sqlite;

use crate::core::config::{StorageBackendKind, StorageConfig};
use crate::core::errors::Result;
use crate::store::backend::{JsonFileBackend, KvBackend, MemoryBackend};

/// Open the backend selected by `[storage]`.
pub fn open_backend(cfg: &StorageConfig) -> Result<Box<dyn KvBackend>> {
    match cfg.backend {
        StorageBackendKind::Json => Ok(Box::new(JsonFileBackend::new(cfg.json_path.clone()))),
        StorageBackendKind::Memory => Ok(Box::new(MemoryBackend::new())),
        #[cfg(feature = "sqlite")]
        StorageBackendKind::Sqlite => Ok(Box::new(sqlite::SqliteBackend::open(&cfg.sqlite_path)?)),
        #[cfg(not(feature = "sqlite"))]
        StorageBackendKind::Sqlite => Err(crate::core::errors::VccError::InvalidConfig {
            details: "storage.backend = \"sqlite\" requires the sqlite feature".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::VccError;

    #[test]
    fn opens_configured_backend() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut cfg = StorageConfig {
            backend: StorageBackendKind::Json,
            json_path: dir.path().join("reports.json"),
            sqlite_path: dir.path().join("reports.sqlite3"),
        };
        assert_eq!(open_backend(&cfg).unwrap().name(), "json");

        cfg.backend = StorageBackendKind::Memory;
        assert_eq!(open_backend(&cfg).unwrap().name(), "memory");

        cfg.backend = StorageBackendKind::Sqlite;
        let opened = open_backend(&cfg);
        if cfg!(feature = "sqlite") {
            assert_eq!(opened.unwrap().name(), "sqlite");
        } else {
            assert!(matches!(opened, Err(VccError::InvalidConfig { .. })));
        }
    }
}
