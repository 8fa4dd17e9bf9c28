//! Integration tests: CLI smoke tests and full-pipeline scenarios over the
//! file-backed stores.

mod common;

use std::fs;

use serde_json::Value;
use vcc_test_recorder::prelude::*;

fn json_line(stdout: &str) -> Value {
    let line = stdout
        .lines()
        .rev()
        .find(|l| l.trim_start().starts_with('{'))
        .unwrap_or_else(|| panic!("no JSON line in output: {stdout}"));
    serde_json::from_str(line).expect("valid JSON output")
}

fn run_args<'a>(ts: &'a str, car: &'a str, date: &'a str) -> Vec<&'a str> {
    vec![
        "run",
        "--train-set",
        ts,
        "--car",
        car,
        "--date",
        date,
        "--fast",
    ]
}

#[test]
fn help_command_prints_usage() {
    let home = tempfile::tempdir().unwrap();
    let result = common::run_cli_case("help_command_prints_usage", home.path(), &["--help"]);
    assert!(
        result.status.success(),
        "expected success; log: {}",
        result.log_path.display()
    );
    assert!(
        result.stdout.contains("Usage: vcc [OPTIONS] <COMMAND>"),
        "missing help banner; log: {}",
        result.log_path.display()
    );
}

#[test]
fn version_command_prints_version() {
    let home = tempfile::tempdir().unwrap();
    let result = common::run_cli_case("version_command_prints_version", home.path(), &["--version"]);
    assert!(result.status.success());
    assert!(
        result.stdout.contains("vcc"),
        "missing version output; log: {}",
        result.log_path.display()
    );
}

#[test]
fn subcommand_help_flags_work() {
    let home = tempfile::tempdir().unwrap();
    for sub in ["run", "report", "list", "catalog", "config", "completions"] {
        let result = common::run_cli_case(
            &format!("subcommand_help_{sub}"),
            home.path(),
            &[sub, "--help"],
        );
        assert!(
            result.status.success(),
            "`vcc {sub} --help` failed; log: {}",
            result.log_path.display()
        );
    }
}

#[test]
fn run_then_list_then_report_over_json_store() {
    let home = tempfile::tempdir().unwrap();
    let mut args = run_args("TS05", "DMC1", "2025-03-14");
    args.extend(["--fail", "21:relay stuck"]);
    let result = common::run_cli_case("run_json_store", home.path(), &args);
    assert!(
        result.status.success(),
        "run failed; log: {}",
        result.log_path.display()
    );

    let payload = json_line(&result.stdout);
    assert_eq!(payload["command"], "run");
    assert_eq!(payload["key"], "TS05_DMC1_20250314");
    assert_eq!(payload["stats"]["failed"], 1);
    let door = &payload["report"]["systemResults"]["Door System"];
    assert_eq!(door["pass"], 0);
    assert_eq!(door["fail"], 1);
    assert_eq!(door["total"], 1);
    assert!(home.path().join("reports.json").exists());

    let listed = common::run_cli_case("list_json_store", home.path(), &["list"]);
    assert!(listed.status.success());
    let payload = json_line(&listed.stdout);
    let reports = payload["reports"].as_array().unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0]["key"], "TS05_DMC1_20250314");

    let shown = common::run_cli_case_with_env(
        "report_human",
        home.path(),
        &["report", "TS05_DMC1_20250314", "--no-color"],
        &[("VCC_OUTPUT_FORMAT", "human")],
    );
    assert!(shown.status.success());
    assert!(shown.stdout.contains("Train set: TS05"));
    assert!(shown.stdout.contains("27 passed, 1 failed (28 total)"));
    assert!(shown.stdout.contains("relay stuck"));
}

#[test]
fn human_run_prints_narration_in_order() {
    let home = tempfile::tempdir().unwrap();
    let result = common::run_cli_case_with_env(
        "human_run",
        home.path(),
        &run_args("TS02", "TC1", "2025-01-02"),
        &[("VCC_OUTPUT_FORMAT", "human"), ("NO_COLOR", "1")],
    );
    assert!(result.status.success(), "log: {}", result.log_path.display());
    let out = &result.stdout;
    let order = [
        "Starting VCC Test for Train Set TS02, Car TC1",
        "3. Visual Inspection and Preparation",
        "Testing DMC1 Car",
        "Testing Door System (Section 4.7)",
        "Testing DMC2 Car",
        "All tests completed",
        "Please fill in the test results form",
        "Test results saved successfully!",
    ];
    let mut cursor = 0;
    for needle in order {
        let found = out[cursor..]
            .find(needle)
            .unwrap_or_else(|| panic!("{needle:?} missing or out of order; log: {}", result.log_path.display()));
        cursor += found + needle.len();
    }
}

#[test]
fn rerun_same_key_replaces_report() {
    let home = tempfile::tempdir().unwrap();
    let first = common::run_cli_case("rerun_first", home.path(), &run_args("TS07", "MC1", "2025-04-01"));
    assert!(first.status.success());
    let mut args = run_args("TS07", "MC1", "2025-04-01");
    args.extend(["--fail", "14:pressure low", "--fail", "15"]);
    let second = common::run_cli_case("rerun_second", home.path(), &args);
    assert!(second.status.success());

    let listed = common::run_cli_case("rerun_list", home.path(), &["list", "--train-set", "TS07"]);
    let payload = json_line(&listed.stdout);
    let reports = payload["reports"].as_array().unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0]["stats"]["failed"], 2);
}

#[test]
fn list_filters_and_orders_newest_first() {
    let home = tempfile::tempdir().unwrap();
    for (ts, car, date) in [
        ("TS05", "DMC1", "2025-01-10"),
        ("TS05", "TC2", "2025-03-02"),
        ("TS15", "MC2", "2025-04-01"),
    ] {
        let result = common::run_cli_case("list_seed", home.path(), &run_args(ts, car, date));
        assert!(result.status.success(), "log: {}", result.log_path.display());
    }

    let listed = common::run_cli_case("list_filtered", home.path(), &["list", "--train-set", "TS05"]);
    let payload = json_line(&listed.stdout);
    let keys: Vec<&str> = payload["reports"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["key"].as_str().unwrap())
        .collect();
    assert_eq!(keys, ["TS05_TC2_20250302", "TS05_DMC1_20250110"]);
}

#[test]
fn sqlite_backend_persists_reports() {
    let home = tempfile::tempdir().unwrap();
    let env = [("VCC_STORAGE_BACKEND", "sqlite")];
    let result = common::run_cli_case_with_env(
        "sqlite_run",
        home.path(),
        &run_args("TS11", "DMC2", "2025-06-30"),
        &env,
    );
    assert!(result.status.success(), "log: {}", result.log_path.display());
    assert!(home.path().join("reports.sqlite3").exists());

    let shown = common::run_cli_case_with_env(
        "sqlite_report",
        home.path(),
        &["report", "TS11_DMC2_20250630"],
        &env,
    );
    assert!(shown.status.success());
    let payload = json_line(&shown.stdout);
    assert_eq!(payload["report"]["carNumber"], "DMC2");
}

#[test]
fn user_errors_exit_with_code_one() {
    let home = tempfile::tempdir().unwrap();
    let cases: [(&str, Vec<&str>); 4] = [
        ("unknown_train_set", run_args("TS99", "DMC1", "2025-03-14")),
        ("unknown_car", run_args("TS05", "XC9", "2025-03-14")),
        ("missing_report", vec!["report", "TS01_TC1_20250101"]),
        ("unknown_item", {
            let mut args = run_args("TS05", "DMC1", "2025-03-14");
            args.extend(["--fail", "404:nope"]);
            args
        }),
    ];
    for (name, args) in cases {
        let result = common::run_cli_case(name, home.path(), &args);
        assert_eq!(
            result.status.code(),
            Some(1),
            "{name}: expected exit 1; log: {}",
            result.log_path.display()
        );
    }
    assert!(!home.path().join("reports.json").exists());
}

#[test]
fn require_review_policy_blocks_unmarked_run() {
    let home = tempfile::tempdir().unwrap();
    let result = common::run_cli_case_with_env(
        "require_review",
        home.path(),
        &run_args("TS05", "DMC1", "2025-03-14"),
        &[("VCC_CHECKLIST_UNREVIEWED_POLICY", "require_review")],
    );
    assert_eq!(result.status.code(), Some(1));
    assert!(result.stderr.contains("unreviewed items"));
    assert!(!home.path().join("reports.json").exists());
}

#[test]
fn activity_log_records_run_events() {
    let home = tempfile::tempdir().unwrap();
    let result = common::run_cli_case("activity_log", home.path(), &run_args("TS03", "TC2", "2025-02-02"));
    assert!(result.status.success());

    let log = fs::read_to_string(home.path().join("activity.jsonl")).unwrap();
    let events: Vec<String> = log
        .lines()
        .map(|line| serde_json::from_str::<Value>(line).unwrap()["event"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(events.first().map(String::as_str), Some("run_started"));
    assert_eq!(events.last().map(String::as_str), Some("results_saved"));
    assert!(events.iter().any(|e| e == "sequence_completed"));
}

#[test]
fn catalog_lists_every_item() {
    let home = tempfile::tempdir().unwrap();
    let result = common::run_cli_case("catalog", home.path(), &["catalog"]);
    assert!(result.status.success());
    let payload = json_line(&result.stdout);
    assert_eq!(
        payload["items"].as_array().unwrap().len(),
        vcc_test_recorder::catalog::test_items().len()
    );
    assert_eq!(payload["systems"].as_array().unwrap().len(), 10);
}

#[test]
fn config_commands_report_validity() {
    let home = tempfile::tempdir().unwrap();
    let missing = home.path().join("nope.toml");
    let result = common::run_cli_case(
        "config_missing",
        home.path(),
        &["config", "validate", "--config", missing.to_str().unwrap()],
    );
    assert_eq!(result.status.code(), Some(1));

    let path = home.path().join("vcc.toml");
    fs::write(
        &path,
        "[checklist]\nunreviewed_policy = \"require_review\"\n\n[status]\nmax_lines = 50\n",
    )
    .unwrap();
    let result = common::run_cli_case(
        "config_valid",
        home.path(),
        &["config", "validate", "--config", path.to_str().unwrap()],
    );
    assert!(result.status.success(), "log: {}", result.log_path.display());
    let payload = json_line(&result.stdout);
    assert_eq!(payload["valid"], true);

    fs::write(&path, "[narration]\npace_scale = 99.0\n").unwrap();
    let result = common::run_cli_case(
        "config_invalid",
        home.path(),
        &["config", "validate", "--config", path.to_str().unwrap()],
    );
    assert_eq!(result.status.code(), Some(1));
    assert_eq!(json_line(&result.stdout)["valid"], false);
}

#[test]
fn completions_generate_script() {
    let home = tempfile::tempdir().unwrap();
    let result = common::run_cli_case("completions_bash", home.path(), &["completions", "bash"]);
    assert!(result.status.success());
    assert!(result.stdout.contains("vcc"));
}

// ──────────────────── library pipeline ────────────────────

fn controller_over<B: KvBackend>(backend: B) -> TestRunController<B> {
    let clock = FixedClock::parse("2025-03-14T09:45:00+05:30", "IST").unwrap();
    TestRunController::new(ReportStore::new(backend), Box::new(clock))
}

#[test]
fn json_file_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reports.json");

    let mut ctl = controller_over(JsonFileBackend::new(path.clone()));
    ctl.start("TS08", "MC2", "").unwrap();
    ctl.run_to_completion();
    ctl.record_result(21, Verdict::Fail, "relay stuck").unwrap();
    let saved = ctl.commit().unwrap();
    assert_eq!(saved.test_time, "09:45 AM IST");

    let reopened = ReportStore::new(JsonFileBackend::new(path));
    let listed = reopened.list(Some("TS08")).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].key.as_str(), "TS08_MC2_20250314");
    assert_eq!(listed[0].report, saved);
}

#[test]
fn memory_store_is_shared_between_controllers() {
    let backend = MemoryBackend::new();
    let mut writer = controller_over(backend.clone());
    writer.start("TS01", "DMC1", "2025-01-01").unwrap();
    writer.run_to_completion();
    writer.commit().unwrap();

    let mut reader = controller_over(backend);
    let report = reader.load_report("TS01_DMC1_20250101").unwrap();
    assert_eq!(report.stats().passed, report.results.len());
    assert_eq!(reader.phase(), RunPhase::Reporting);
    assert!(reader.generate_report().is_ok());
}
