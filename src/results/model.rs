//! Result records: per-item verdicts, per-system summaries, and the stored report shape.
//!
//! Field names serialize in camelCase and verdicts as `"PASS"` / `"FAIL"` / `""`
//! so persisted reports keep the checksheet's established layout.

#![allow(missing_docs)]

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::TestItem;

/// Operator verdict for one checklist item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Verdict {
    #[serde(rename = "PASS")]
    Pass,
    #[serde(rename = "FAIL")]
    Fail,
    /// Not yet selected on the checklist.
    #[default]
    #[serde(rename = "")]
    Unset,
}

impl Verdict {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
            Self::Unset => "",
        }
    }

    #[must_use]
    pub const fn is_set(self) -> bool {
        !matches!(self, Self::Unset)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset => f.write_str("UNSET"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Outcome recorded against one catalog item during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub id: u32,
    pub system: String,
    pub code: String,
    pub name: String,
    pub drawing: String,
    pub expected: String,
    #[serde(default)]
    pub result: Verdict,
    #[serde(default)]
    pub failing_reason: String,
}

impl TestResult {
    /// Copy the item's descriptive fields and attach a verdict.
    #[must_use]
    pub fn from_item(item: &TestItem, result: Verdict, failing_reason: impl Into<String>) -> Self {
        Self {
            id: item.id,
            system: item.system.to_string(),
            code: item.code.to_string(),
            name: item.name.to_string(),
            drawing: item.drawing.to_string(),
            expected: item.expected.to_string(),
            result,
            failing_reason: failing_reason.into(),
        }
    }

    /// Drop a failing reason left over from an earlier FAIL selection.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.result != Verdict::Fail {
            self.failing_reason.clear();
        }
        self
    }
}

/// Pass/fail roll-up for one system. `total` is always `pass + fail`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemSummary {
    pub system: String,
    pub pass: u32,
    pub fail: u32,
    pub total: u32,
}

impl SystemSummary {
    #[must_use]
    pub fn empty(system: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            pass: 0,
            fail: 0,
            total: 0,
        }
    }
}

/// System name → summary. Ordered so serialized reports are byte-stable.
pub type SystemResults = BTreeMap<String, SystemSummary>;

/// A persisted snapshot of one completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub train_set_number: String,
    pub car_number: String,
    pub test_date: String,
    pub test_time: String,
    pub results: Vec<TestResult>,
    pub system_results: SystemResults,
}

impl Report {
    #[must_use]
    pub fn stats(&self) -> ReportStats {
        ReportStats::from_results(&self.results)
    }

    /// Results marked FAIL, in recorded order.
    pub fn failures(&self) -> impl Iterator<Item = &TestResult> {
        self.results.iter().filter(|r| r.result == Verdict::Fail)
    }
}

/// Whole-run counts shown on the report header and in listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ReportStats {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
}

impl ReportStats {
    #[must_use]
    pub fn from_results(results: &[TestResult]) -> Self {
        let passed = results.iter().filter(|r| r.result == Verdict::Pass).count();
        let failed = results.iter().filter(|r| r.result == Verdict::Fail).count();
        Self {
            total: results.len(),
            passed,
            failed,
        }
    }

    /// Share of all results that passed, in percent. Zero when empty.
    #[must_use]
    pub fn pass_pct(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.passed as f64 * 100.0 / self.total as f64
        }
    }

    /// Share of all results that failed, in percent. Zero when empty.
    #[must_use]
    pub fn fail_pct(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.failed as f64 * 100.0 / self.total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;

    #[test]
    fn verdict_serializes_as_checksheet_strings() {
        assert_eq!(serde_json::to_string(&Verdict::Pass).unwrap(), "\"PASS\"");
        assert_eq!(serde_json::to_string(&Verdict::Fail).unwrap(), "\"FAIL\"");
        assert_eq!(serde_json::to_string(&Verdict::Unset).unwrap(), "\"\"");
        let back: Verdict = serde_json::from_str("\"\"").unwrap();
        assert_eq!(back, Verdict::Unset);
    }

    #[test]
    fn test_result_uses_camel_case_fields() {
        let item = catalog::find_item(21).unwrap();
        let result = TestResult::from_item(item, Verdict::Fail, "relay stuck");
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["failingReason"], "relay stuck");
        assert_eq!(value["result"], "FAIL");
        assert_eq!(value["system"], "Door System");
    }

    #[test]
    fn missing_result_fields_default_to_unset() {
        let raw = r#"{"id":1,"system":"Train System","code":"4.1.1","name":"n","drawing":"d","expected":"e"}"#;
        let parsed: TestResult = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.result, Verdict::Unset);
        assert!(parsed.failing_reason.is_empty());
    }

    #[test]
    fn normalized_clears_reason_unless_failed() {
        let item = catalog::find_item(1).unwrap();
        let pass = TestResult::from_item(item, Verdict::Pass, "stale").normalized();
        assert!(pass.failing_reason.is_empty());
        let fail = TestResult::from_item(item, Verdict::Fail, "open circuit").normalized();
        assert_eq!(fail.failing_reason, "open circuit");
        let fail_blank = TestResult::from_item(item, Verdict::Fail, "").normalized();
        assert_eq!(fail_blank.result, Verdict::Fail);
    }

    #[test]
    fn stats_count_each_verdict() {
        let items = catalog::test_items();
        let results = vec![
            TestResult::from_item(&items[0], Verdict::Pass, ""),
            TestResult::from_item(&items[1], Verdict::Fail, "x"),
            TestResult::from_item(&items[2], Verdict::Pass, ""),
            TestResult::from_item(&items[3], Verdict::Pass, ""),
        ];
        let stats = ReportStats::from_results(&results);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.passed, 3);
        assert_eq!(stats.failed, 1);
        assert!((stats.pass_pct() - 75.0).abs() < 1e-9);
        assert!((stats.fail_pct() - 25.0).abs() < 1e-9);
        assert!(ReportStats::default().pass_pct().abs() < f64::EPSILON);
    }
}
