//! Test run controller: one run from setup through saved report.
//!
//! Phases advance `Idle → Running → AwaitingInput → Saved → Reporting`.
//! [`TestRunController::start`] resets to `Running` from any phase. Every
//! failing operation leaves the controller exactly as it found it.

#![allow(missing_docs)]

use std::collections::BTreeMap;

use serde::Serialize;

use crate::catalog;
use crate::core::clock::{Clock, format_test_date, format_test_time};
use crate::core::config::{Config, UnreviewedPolicy};
use crate::core::errors::{Result, VccError};
use crate::logger::ActivityLog;
use crate::logger::jsonl::{EventType, LogEntry, Severity};
use crate::results::aggregate::summarize;
use crate::results::model::{Report, SystemResults, TestResult, Verdict};
use crate::session::script::{NarrationScript, ScriptStep};
use crate::session::status::{LineKind, StatusLine, StatusLog};
use crate::store::backend::KvBackend;
use crate::store::reports::{ReportKey, ReportStore, StoredReport};

const SEQUENCE_DONE: [&str; 2] = ["All tests completed", "Please fill in the test results form"];
const SAVE_DONE: [&str; 2] = [
    "Test results saved successfully!",
    "Click 'Generate Test Report' to view the results.",
];

/// Where the run currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    #[default]
    Idle,
    Running,
    AwaitingInput,
    Saved,
    Reporting,
}

impl RunPhase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::AwaitingInput => "awaiting_input",
            Self::Saved => "saved",
            Self::Reporting => "reporting",
        }
    }
}

/// Who and when: the setup fields plus the captured time.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunIdentity {
    pub train_set_number: String,
    pub car_number: String,
    pub test_date: String,
    pub test_time: String,
}

/// Read-only copy of controller state for a display surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSnapshot {
    pub identity: RunIdentity,
    pub phase: RunPhase,
    pub is_running: bool,
    pub status: Vec<StatusLine>,
    pub results: Vec<TestResult>,
    pub system_results: SystemResults,
}

/// Owns one operator session: identity, narration, results, and the store.
pub struct TestRunController<B: KvBackend> {
    store: ReportStore<B>,
    clock: Box<dyn Clock>,
    policy: UnreviewedPolicy,
    activity: Option<Box<dyn ActivityLog>>,
    phase: RunPhase,
    identity: RunIdentity,
    status: StatusLog,
    script: Option<NarrationScript>,
    results: Vec<TestResult>,
    system_results: SystemResults,
}

impl<B: KvBackend> TestRunController<B> {
    pub fn new(store: ReportStore<B>, clock: Box<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            policy: UnreviewedPolicy::default(),
            activity: None,
            phase: RunPhase::Idle,
            identity: RunIdentity::default(),
            status: StatusLog::unbounded(),
            script: None,
            results: Vec::new(),
            system_results: empty_summaries(),
        }
    }

    /// Controller with the `[checklist]` and `[status]` settings applied.
    pub fn from_config(cfg: &Config, store: ReportStore<B>, clock: Box<dyn Clock>) -> Self {
        Self::new(store, clock)
            .with_policy(cfg.checklist.unreviewed_policy)
            .with_status_capacity(cfg.status.max_lines)
    }

    #[must_use]
    pub fn with_policy(mut self, policy: UnreviewedPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Bound the status log; `0` keeps it unbounded.
    #[must_use]
    pub fn with_status_capacity(mut self, max_lines: usize) -> Self {
        self.status = StatusLog::with_capacity(max_lines);
        self
    }

    #[must_use]
    pub fn with_activity_log(mut self, sink: Box<dyn ActivityLog>) -> Self {
        self.activity = Some(sink);
        self
    }

    // ──────────────────── run lifecycle ────────────────────

    /// Validate the setup fields and begin a fresh run.
    ///
    /// A blank `test_date` takes the clock's local date.
    pub fn start(&mut self, train_set: &str, car: &str, test_date: &str) -> Result<()> {
        let train_set = train_set.trim();
        let car = car.trim();
        let missing = if train_set.is_empty() {
            Some("trainSetNumber")
        } else if car.is_empty() {
            Some("carNumber")
        } else {
            None
        };
        if let Some(field) = missing {
            let err = VccError::missing_field(field);
            self.log_failure(EventType::ValidationFailed, &err);
            return Err(err);
        }

        let test_date = match test_date.trim() {
            "" => format_test_date(self.clock.as_ref()),
            given => given.to_string(),
        };
        let test_time = format_test_time(self.clock.as_ref());

        self.status.clear();
        self.status.append(
            format!("Starting VCC Test for Train Set {train_set}, Car {car}"),
            LineKind::Normal,
        );
        self.status.append(
            format!("Test Date: {test_date}, Time: {test_time}"),
            LineKind::Normal,
        );
        self.identity = RunIdentity {
            train_set_number: train_set.to_string(),
            car_number: car.to_string(),
            test_date,
            test_time,
        };
        self.results.clear();
        self.system_results = empty_summaries();
        self.script = Some(NarrationScript::new());
        self.phase = RunPhase::Running;

        let entry = LogEntry::new(EventType::RunStarted, Severity::Info).run(
            &self.identity.train_set_number,
            &self.identity.car_number,
            &self.identity.test_date,
        );
        self.emit(&entry);
        Ok(())
    }

    /// Advance the narration by one step, appending it to the status log.
    ///
    /// Returns `None` once the sequence is over; the call that discovers the
    /// end moves the run to `AwaitingInput`.
    pub fn next_step(&mut self) -> Option<ScriptStep> {
        if self.phase != RunPhase::Running {
            return None;
        }
        let step = self.script.as_mut().and_then(NarrationScript::next);
        match step {
            Some(step) => {
                self.status.push(step.line.clone());
                Some(step)
            }
            None => {
                self.finish_sequence();
                None
            }
        }
    }

    /// Play every remaining step without pacing.
    pub fn run_to_completion(&mut self) {
        while self.next_step().is_some() {}
    }

    fn finish_sequence(&mut self) {
        self.script = None;
        self.phase = RunPhase::AwaitingInput;
        for line in SEQUENCE_DONE {
            self.status.append(line, LineKind::Normal);
        }
        let entry = LogEntry::new(EventType::SequenceCompleted, Severity::Info).run(
            &self.identity.train_set_number,
            &self.identity.car_number,
            &self.identity.test_date,
        );
        self.emit(&entry);
    }

    // ──────────────────── results ────────────────────

    /// Set the verdict for one checklist item, replacing any earlier one.
    pub fn record_result(&mut self, item_id: u32, verdict: Verdict, reason: &str) -> Result<()> {
        self.require_phase("record result", &[RunPhase::AwaitingInput])?;
        let item = catalog::find_item(item_id).ok_or(VccError::UnknownTestItem { id: item_id })?;

        let result = TestResult::from_item(item, verdict, reason);
        match self.results.iter_mut().find(|r| r.id == item_id) {
            Some(existing) => *existing = result,
            None => self.results.push(result),
        }

        let mut entry = LogEntry::new(EventType::ResultRecorded, Severity::Info);
        entry.item_id = Some(item_id);
        entry.verdict = Some(verdict.to_string());
        self.emit(&entry);
        Ok(())
    }

    /// Save what `record_result` collected, completed against the catalog.
    pub fn commit(&mut self) -> Result<Report> {
        let recorded = self.results.clone();
        self.save_results(recorded)
    }

    /// Resolve, summarize, and persist a full result set.
    ///
    /// `results` may be partial or contain repeats (the last entry per id
    /// wins). Items left without a verdict follow the unreviewed policy.
    pub fn save_results(&mut self, results: Vec<TestResult>) -> Result<Report> {
        self.require_phase("save results", &[RunPhase::AwaitingInput, RunPhase::Saved])?;

        let mut given: BTreeMap<u32, TestResult> = BTreeMap::new();
        for result in results {
            if catalog::find_item(result.id).is_none() {
                return Err(VccError::UnknownTestItem { id: result.id });
            }
            given.insert(result.id, result);
        }

        let mut resolved = Vec::with_capacity(catalog::test_items().len());
        let mut unreviewed = Vec::new();
        for item in catalog::test_items() {
            match given.remove(&item.id).filter(|r| r.result.is_set()) {
                Some(r) => resolved.push(TestResult::from_item(item, r.result, r.failing_reason)),
                None => {
                    unreviewed.push(item.id);
                    resolved.push(TestResult::from_item(item, Verdict::Pass, ""));
                }
            }
        }

        if self.policy == UnreviewedPolicy::RequireReview && !unreviewed.is_empty() {
            let ids: Vec<String> = unreviewed.iter().map(u32::to_string).collect();
            let err = VccError::Validation {
                field: "results",
                details: format!("unreviewed items: {}", ids.join(", ")),
            };
            self.log_failure(EventType::ValidationFailed, &err);
            return Err(err);
        }

        let resolved: Vec<TestResult> = resolved.into_iter().map(TestResult::normalized).collect();
        let system_results = summarize(&resolved, catalog::system_names());
        let report = Report {
            train_set_number: self.identity.train_set_number.clone(),
            car_number: self.identity.car_number.clone(),
            test_date: self.identity.test_date.clone(),
            test_time: self.identity.test_time.clone(),
            results: resolved,
            system_results,
        };
        let key = ReportKey::for_report(&report);

        if let Err(err) = self.store.save(&key, &report) {
            self.log_failure(EventType::StorageError, &err);
            return Err(err);
        }

        self.results.clone_from(&report.results);
        self.system_results.clone_from(&report.system_results);
        self.phase = RunPhase::Saved;
        self.status.clear();
        for line in SAVE_DONE {
            self.status.append(line, LineKind::Normal);
        }

        let stats = report.stats();
        let mut entry = LogEntry::new(EventType::ResultsSaved, Severity::Info).run(
            &report.train_set_number,
            &report.car_number,
            &report.test_date,
        );
        entry.report_key = Some(key.to_string());
        entry.passed = Some(stats.passed);
        entry.failed = Some(stats.failed);
        entry.total = Some(stats.total);
        self.emit(&entry);

        Ok(report)
    }

    // ──────────────────── reports ────────────────────

    /// Report view of the saved run.
    pub fn generate_report(&mut self) -> Result<Report> {
        if self.results.is_empty() {
            return Err(VccError::EmptyResultSet);
        }
        self.require_phase("generate report", &[RunPhase::Saved, RunPhase::Reporting])?;
        self.phase = RunPhase::Reporting;
        Ok(self.current_report())
    }

    /// Bring a stored report back for display.
    pub fn load_report(&mut self, key: &str) -> Result<Report> {
        let report = match self.store.load(key) {
            Ok(Some(report)) => report,
            Ok(None) => {
                return Err(VccError::ReportNotFound {
                    key: key.to_string(),
                });
            }
            Err(err) => {
                self.log_failure(EventType::StorageError, &err);
                return Err(err);
            }
        };

        self.identity = RunIdentity {
            train_set_number: report.train_set_number.clone(),
            car_number: report.car_number.clone(),
            test_date: report.test_date.clone(),
            test_time: report.test_time.clone(),
        };
        self.results.clone_from(&report.results);
        self.system_results.clone_from(&report.system_results);
        self.script = None;
        self.status.clear();
        self.phase = RunPhase::Reporting;

        let mut entry = LogEntry::new(EventType::ReportLoaded, Severity::Info);
        entry.report_key = Some(key.to_string());
        self.emit(&entry);
        Ok(report)
    }

    /// Stored reports, newest first, optionally for one train set.
    pub fn list_reports(&self, train_set: Option<&str>) -> Result<Vec<StoredReport>> {
        self.store.list(train_set)
    }

    // ──────────────────── accessors ────────────────────

    #[must_use]
    pub fn snapshot(&self) -> RunSnapshot {
        RunSnapshot {
            identity: self.identity.clone(),
            phase: self.phase,
            is_running: self.is_running(),
            status: self.status.lines().cloned().collect(),
            results: self.results.clone(),
            system_results: self.system_results.clone(),
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == RunPhase::Running
    }

    pub fn identity(&self) -> &RunIdentity {
        &self.identity
    }

    pub fn status(&self) -> &StatusLog {
        &self.status
    }

    pub fn results(&self) -> &[TestResult] {
        &self.results
    }

    pub fn system_results(&self) -> &SystemResults {
        &self.system_results
    }

    pub fn policy(&self) -> UnreviewedPolicy {
        self.policy
    }

    pub fn store(&self) -> &ReportStore<B> {
        &self.store
    }

    // ──────────────────── internals ────────────────────

    fn current_report(&self) -> Report {
        Report {
            train_set_number: self.identity.train_set_number.clone(),
            car_number: self.identity.car_number.clone(),
            test_date: self.identity.test_date.clone(),
            test_time: self.identity.test_time.clone(),
            results: self.results.clone(),
            system_results: self.system_results.clone(),
        }
    }

    fn require_phase(&self, operation: &'static str, allowed: &[RunPhase]) -> Result<()> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(VccError::InvalidPhase {
                operation,
                phase: self.phase.as_str(),
            })
        }
    }

    fn log_failure(&mut self, event: EventType, err: &VccError) {
        let entry = LogEntry::new(event, Severity::Warning).error(err);
        self.emit(&entry);
    }

    fn emit(&mut self, entry: &LogEntry) {
        if let Some(sink) = self.activity.as_mut() {
            sink.record(entry);
        }
    }
}

fn empty_summaries() -> SystemResults {
    summarize(std::iter::empty::<&TestResult>(), catalog::system_names())
}
