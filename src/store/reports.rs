//! Named report records over a key-value backend.
//!
//! The whole collection is one JSON object (`report key → Report`) held as a
//! string under [`REPORTS_COLLECTION_KEY`]. Every save reads it, upserts one
//! entry, and writes it back wholesale.

#![allow(missing_docs)]

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::core::errors::{Result, VccError};
use crate::results::model::Report;
use crate::store::backend::KvBackend;

/// Outer key the report collection is stored under.
pub const REPORTS_COLLECTION_KEY: &str = "vcc_reports";

/// Composite `trainSet_car_YYYYMMDD` identity of a report.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ReportKey(String);

impl ReportKey {
    #[must_use]
    pub fn new(train_set: &str, car: &str, test_date: &str) -> Self {
        Self(format!("{train_set}_{car}_{}", test_date.replace('-', "")))
    }

    #[must_use]
    pub fn for_report(report: &Report) -> Self {
        Self::new(
            &report.train_set_number,
            &report.car_number,
            &report.test_date,
        )
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReportKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ReportKey {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

/// A report together with the key it is stored under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredReport {
    pub key: ReportKey,
    pub report: Report,
}

/// Durable collection of reports.
pub struct ReportStore<B: KvBackend> {
    backend: B,
}

impl<B: KvBackend> ReportStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Insert or fully replace the report under `key`.
    pub fn save(&mut self, key: &ReportKey, report: &Report) -> Result<()> {
        let mut collection = self.read_collection()?;
        collection.insert(key.as_str().to_string(), report.clone());
        let raw = serde_json::to_string(&collection)?;
        self.backend.put(REPORTS_COLLECTION_KEY, &raw)
    }

    /// Report stored under `key`, if any.
    pub fn load(&self, key: &str) -> Result<Option<Report>> {
        Ok(self.read_collection()?.remove(key))
    }

    /// Reports newest `testDate` first, optionally restricted to one train set.
    ///
    /// An empty filter behaves like no filter. Reports sharing a date are
    /// ordered by key ascending; dates that do not parse as `YYYY-MM-DD` sort
    /// after every dated report.
    pub fn list(&self, train_set: Option<&str>) -> Result<Vec<StoredReport>> {
        let filter = train_set.map(str::trim).filter(|ts| !ts.is_empty());
        let mut reports: Vec<StoredReport> = self
            .read_collection()?
            .into_iter()
            .filter(|(_, report)| filter.is_none_or(|ts| report.train_set_number == ts))
            .map(|(key, report)| StoredReport {
                key: ReportKey(key),
                report,
            })
            .collect();
        reports.sort_by(newest_first);
        Ok(reports)
    }

    /// Number of stored reports.
    pub fn len(&self) -> Result<usize> {
        Ok(self.read_collection()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn read_collection(&self) -> Result<BTreeMap<String, Report>> {
        let Some(raw) = self.backend.get(REPORTS_COLLECTION_KEY)? else {
            return Ok(BTreeMap::new());
        };
        serde_json::from_str(&raw).map_err(|error| VccError::Storage {
            context: "report-collection",
            details: format!(
                "{} backend holds an unreadable report collection: {error}",
                self.backend.name()
            ),
        })
    }
}

fn parse_test_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

fn newest_first(a: &StoredReport, b: &StoredReport) -> Ordering {
    let date_a = parse_test_date(&a.report.test_date);
    let date_b = parse_test_date(&b.report.test_date);
    date_b
        .cmp(&date_a)
        .then_with(|| a.key.cmp(&b.key))
}
