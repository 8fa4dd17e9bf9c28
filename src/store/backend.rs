//! Opaque key-value media the report collection lives in.
//!
//! Backends store whole string values under string keys and know nothing about
//! reports. [`ReportStore`](crate::store::reports::ReportStore) layers the
//! collection format on top.

#![allow(missing_docs)]

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::core::errors::{Result, VccError};

/// String key → string value storage with atomic upsert.
pub trait KvBackend {
    /// Short label used in logs and error contexts.
    fn name(&self) -> &'static str;

    /// Value under `key`, or `None` when never written.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Insert or replace the value under `key`.
    fn put(&mut self, key: &str, value: &str) -> Result<()>;
}

impl<B: KvBackend + ?Sized> KvBackend for Box<B> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn put(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).put(key, value)
    }
}

// ──────────────────── memory ────────────────────

/// Process-local map. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl KvBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ──────────────────── json file ────────────────────

/// One JSON object on disk mapping keys to string values.
///
/// Every `put` rewrites the document through a temp file and an atomic rename,
/// so a crash leaves either the old or the new document.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<BTreeMap<String, String>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(error) => return Err(VccError::io(&self.path, error)),
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|error| VccError::Storage {
            context: "json-file",
            details: format!("{} is not a key-value document: {error}", self.path.display()),
        })
    }

    fn write_document(&self, doc: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| VccError::io(parent, source))?;
        }

        let tmp_path = self.path.with_extension("tmp");
        let data = serde_json::to_vec_pretty(doc)?;
        fs::write(&tmp_path, data).map_err(|source| VccError::io(&tmp_path, source))?;
        fs::rename(&tmp_path, &self.path).map_err(|source| VccError::io(&self.path, source))?;
        Ok(())
    }
}

impl KvBackend for JsonFileBackend {
    fn name(&self) -> &'static str {
        "json"
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_document()?.remove(key))
    }

    fn put(&mut self, key: &str, value: &str) -> Result<()> {
        let mut doc = self.read_document()?;
        doc.insert(key.to_string(), value.to_string());
        self.write_document(&doc)
    }
}
