//! Top-level CLI definition and command dispatch.

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::thread;

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell as CompletionShell, generate};
use colored::{Colorize, control};
use serde_json::{Value, json};
use thiserror::Error;

use vcc_test_recorder::catalog::{self, CarRole};
use vcc_test_recorder::core::clock::SystemClock;
use vcc_test_recorder::core::config::Config;
use vcc_test_recorder::core::errors::VccError;
use vcc_test_recorder::logger::jsonl::{JsonlConfig, JsonlWriter};
use vcc_test_recorder::results::model::{Report, Verdict};
use vcc_test_recorder::session::controller::TestRunController;
use vcc_test_recorder::session::status::{LineKind, StatusLine};
use vcc_test_recorder::store::backend::KvBackend;
use vcc_test_recorder::store::open_backend;
use vcc_test_recorder::store::reports::{ReportKey, ReportStore};

/// VCC test recorder: run, record, and review vehicle control-circuit checklists.
#[derive(Debug, Parser)]
#[command(
    name = "vcc",
    author,
    version,
    about = "VCC Test Recorder - railway control-circuit checklist runs and reports",
    long_about = None,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Override config file path.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Force JSON output mode.
    #[arg(long, global = true)]
    json: bool,
    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Play the test sequence, record verdicts, and save the report.
    Run(RunArgs),
    /// Show a stored report.
    Report(ReportArgs),
    /// List stored reports, newest first.
    List(ListArgs),
    /// Print the checklist grouped by system.
    Catalog,
    /// View and check configuration.
    Config(ConfigArgs),
    /// Generate shell completions.
    Completions(CompletionsArgs),
}

#[derive(Debug, Clone, Args)]
struct RunArgs {
    /// Train set under test (TS01..TS17).
    #[arg(long, value_name = "TS")]
    train_set: String,
    /// Car under test (DMC1, TC1, MC1, MC2, TC2, DMC2).
    #[arg(long, value_name = "CAR")]
    car: String,
    /// Test date as YYYY-MM-DD; today when omitted.
    #[arg(long, value_name = "DATE", default_value = "")]
    date: String,
    /// Mark an item failed, optionally with a reason: `21:relay stuck`.
    #[arg(long = "fail", value_name = "ID[:REASON]")]
    fails: Vec<String>,
    /// Mark an item passed.
    #[arg(long = "pass", value_name = "ID")]
    passes: Vec<u32>,
    /// Skip narration pacing.
    #[arg(long)]
    fast: bool,
}

#[derive(Debug, Clone, Args)]
struct ReportArgs {
    /// Report key, e.g. TS05_DMC1_20250314.
    key: String,
}

#[derive(Debug, Clone, Args, Default)]
struct ListArgs {
    /// Only reports for this train set.
    #[arg(long, value_name = "TS")]
    train_set: Option<String>,
}

#[derive(Debug, Clone, Args, Default)]
struct ConfigArgs {
    /// Config operation to run.
    #[command(subcommand)]
    command: Option<ConfigCommand>,
}

#[derive(Debug, Clone, Subcommand)]
enum ConfigCommand {
    /// Print resolved config file path.
    Path,
    /// Print effective merged configuration.
    Show,
    /// Validate configuration and exit.
    Validate,
}

#[derive(Debug, Clone, Args)]
struct CompletionsArgs {
    /// Shell to generate completion script for.
    #[arg(value_enum)]
    shell: CompletionShell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Human,
    Json,
}

/// CLI error type with explicit exit-code mapping.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input at runtime.
    #[error("{0}")]
    User(String),
    /// Environment/runtime failure.
    #[error("{0}")]
    Runtime(String),
    /// Internal bug or invariant violation.
    #[error("{0}")]
    Internal(String),
    /// JSON serialization failed.
    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
    /// Output write failed.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Process exit code contract for the CLI.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::User(_) => 1,
            Self::Runtime(_) | Self::Io(_) => 2,
            Self::Internal(_) | Self::Json(_) => 3,
        }
    }
}

impl From<VccError> for CliError {
    fn from(err: VccError) -> Self {
        match err {
            VccError::Serialization { .. } => Self::Internal(err.to_string()),
            VccError::InvalidConfig { .. }
            | VccError::MissingConfig { .. }
            | VccError::ConfigParse { .. } => Self::User(err.to_string()),
            _ if err.is_user_error() => Self::User(err.to_string()),
            _ => Self::Runtime(err.to_string()),
        }
    }
}

type Controller = TestRunController<Box<dyn KvBackend>>;

/// Dispatch CLI commands.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    if cli.no_color {
        control::set_override(false);
    }

    match &cli.command {
        Command::Run(args) => run_test(cli, args),
        Command::Report(args) => run_report(cli, args),
        Command::List(args) => run_list(cli, args),
        Command::Catalog => run_catalog(cli),
        Command::Config(args) => run_config(cli, args),
        Command::Completions(args) => {
            let mut command = Cli::command();
            let binary_name = command.get_name().to_string();
            generate(args.shell, &mut command, binary_name, &mut io::stdout());
            Ok(())
        }
    }
}

fn open_controller(config: &Config) -> Result<Controller, CliError> {
    let backend = open_backend(&config.storage)?;
    let clock = SystemClock::from_config(&config.clock)?;
    let activity = JsonlWriter::open(JsonlConfig::at(config.paths.activity_log.clone()));
    Ok(
        TestRunController::from_config(config, ReportStore::new(backend), Box::new(clock))
            .with_activity_log(Box::new(activity)),
    )
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

fn run_test(cli: &Cli, args: &RunArgs) -> Result<(), CliError> {
    let train_set = args.train_set.trim();
    if !catalog::is_known_train_set(train_set) {
        return Err(CliError::User(format!(
            "unknown train set {train_set:?}: expected TS01..TS{:02}",
            catalog::TRAIN_SET_COUNT
        )));
    }
    let car: CarRole = args.car.parse().map_err(CliError::User)?;
    let fails = args
        .fails
        .iter()
        .map(String::as_str)
        .map(parse_fail_spec)
        .collect::<Result<Vec<_>, _>>()?;

    let config = Config::load(cli.config.as_deref())?;
    let mode = output_mode(cli);
    let pace_scale = if args.fast || mode == OutputMode::Json {
        0.0
    } else {
        config.narration.pace_scale
    };
    let mut ctl = open_controller(&config)?;

    ctl.start(train_set, car.as_str(), &args.date)?;
    if mode == OutputMode::Human {
        for line in ctl.status().lines() {
            print_status_line(line);
        }
    }
    while let Some(step) = ctl.next_step() {
        if mode == OutputMode::Human {
            print_status_line(&step.line);
            io::stdout().flush()?;
        }
        thread::sleep(step.scaled_pace(pace_scale));
    }
    if mode == OutputMode::Human {
        for line in ctl.status().tail(2) {
            print_status_line(line);
        }
    }

    for id in &args.passes {
        ctl.record_result(*id, Verdict::Pass, "")?;
    }
    for (id, reason) in &fails {
        ctl.record_result(*id, Verdict::Fail, reason)?;
    }
    let report = ctl.commit()?;
    let key = ReportKey::for_report(&report).to_string();

    match mode {
        OutputMode::Human => {
            println!();
            for line in ctl.status().lines() {
                print_status_line(line);
            }
            println!();
            print_report(&key, &report);
        }
        OutputMode::Json => {
            let payload = json!({
                "command": "run",
                "key": key,
                "stats": report.stats(),
                "report": report,
            });
            write_json_line(&payload)?;
        }
    }
    Ok(())
}

/// `21` or `21:relay stuck`.
fn parse_fail_spec(raw: &str) -> Result<(u32, String), CliError> {
    let (id, reason) = raw.split_once(':').unwrap_or((raw, ""));
    let id = id
        .trim()
        .parse::<u32>()
        .map_err(|e| CliError::User(format!("invalid --fail item {raw:?}: {e}")))?;
    Ok((id, reason.trim().to_string()))
}

fn print_status_line(line: &StatusLine) {
    match line.kind {
        LineKind::Normal => println!("{}", line.text),
        LineKind::Step => println!("  {}", line.text.cyan()),
        LineKind::Error => println!("{}", line.text.red()),
    }
}

// ---------------------------------------------------------------------------
// report / list
// ---------------------------------------------------------------------------

fn run_report(cli: &Cli, args: &ReportArgs) -> Result<(), CliError> {
    let config = Config::load(cli.config.as_deref())?;
    let mut ctl = open_controller(&config)?;
    let key = args.key.trim();
    let report = ctl.load_report(key)?;

    match output_mode(cli) {
        OutputMode::Human => print_report(key, &report),
        OutputMode::Json => {
            let payload = json!({
                "command": "report",
                "key": key,
                "stats": report.stats(),
                "report": report,
            });
            write_json_line(&payload)?;
        }
    }
    Ok(())
}

fn print_report(key: &str, report: &Report) {
    let stats = report.stats();
    println!(
        "{}",
        format!(
            "VCC Test Report ({} Rev {})",
            catalog::DOCUMENT_NUMBER,
            catalog::DOCUMENT_REVISION
        )
        .bold()
    );
    println!("  Report:    {key}");
    println!(
        "  Train set: {}   Car: {}",
        report.train_set_number, report.car_number
    );
    println!("  Tested:    {} {}", report.test_date, report.test_time);
    println!(
        "  Overall:   {} passed, {} failed ({} total)",
        stats.passed, stats.failed, stats.total
    );
    print_ratio_bar("PASS", stats.pass_pct());
    print_ratio_bar("FAIL", stats.fail_pct());

    println!("  Systems:");
    for name in catalog::system_names() {
        let Some(summary) = report.system_results.get(name) else {
            continue;
        };
        let pct = if summary.total == 0 {
            0.0
        } else {
            f64::from(summary.pass) * 100.0 / f64::from(summary.total)
        };
        let label = format!("{name} {}/{}", summary.pass, summary.total);
        print_ratio_bar(&label, pct);
    }

    let failures: Vec<_> = report.failures().collect();
    if failures.is_empty() {
        println!("  {}", "No failed items.".green());
        return;
    }
    println!("  Failed items:");
    for item in failures {
        let reason = if item.failing_reason.is_empty() {
            "(no reason given)"
        } else {
            item.failing_reason.as_str()
        };
        println!(
            "    {:<7} {:<40} {:<14} {}",
            item.code,
            item.name,
            item.drawing,
            reason.red()
        );
    }
}

fn print_ratio_bar(label: &str, pct: f64) {
    let bar_width = 30;
    let filled = ((pct / 100.0) * bar_width as f64).round() as usize;
    let bar: String = "#".repeat(filled.min(bar_width));
    println!(
        "    {:<26} {:>5.1}% |{:<width$}|",
        label,
        pct,
        bar,
        width = bar_width
    );
}

fn run_list(cli: &Cli, args: &ListArgs) -> Result<(), CliError> {
    let config = Config::load(cli.config.as_deref())?;
    let ctl = open_controller(&config)?;
    let listed = ctl.list_reports(args.train_set.as_deref())?;

    match output_mode(cli) {
        OutputMode::Human => {
            if listed.is_empty() {
                println!("No reports stored.");
                return Ok(());
            }
            for stored in &listed {
                let stats = stored.report.stats();
                println!(
                    "{:<22} {:<10} {:<12} {} passed, {} failed ({} total)",
                    stored.key.as_str(),
                    stored.report.test_date,
                    stored.report.test_time,
                    stats.passed,
                    stats.failed,
                    stats.total,
                );
            }
        }
        OutputMode::Json => {
            let reports: Vec<Value> = listed
                .iter()
                .map(|stored| {
                    json!({
                        "key": stored.key,
                        "trainSetNumber": stored.report.train_set_number,
                        "carNumber": stored.report.car_number,
                        "testDate": stored.report.test_date,
                        "testTime": stored.report.test_time,
                        "stats": stored.report.stats(),
                    })
                })
                .collect();
            let payload = json!({
                "command": "list",
                "filter": args.train_set,
                "reports": reports,
            });
            write_json_line(&payload)?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// catalog / config
// ---------------------------------------------------------------------------

fn run_catalog(cli: &Cli) -> Result<(), CliError> {
    match output_mode(cli) {
        OutputMode::Human => {
            println!(
                "Checklist {} Rev {} (consist {})",
                catalog::DOCUMENT_NUMBER,
                catalog::DOCUMENT_REVISION,
                catalog::CONSIST
            );
            for (system, items) in catalog::items_by_system() {
                let section = catalog::section_of(system).unwrap_or("-");
                println!();
                println!("{} (Section {section})", system.bold());
                for item in items {
                    println!("  {:>2}  {:<7} {}", item.id, item.code, item.name);
                    println!("               expected: {}  [{}]", item.expected, item.drawing);
                }
            }
        }
        OutputMode::Json => {
            let payload = json!({
                "command": "catalog",
                "document": catalog::DOCUMENT_NUMBER,
                "revision": catalog::DOCUMENT_REVISION,
                "systems": catalog::SYSTEMS
                    .iter()
                    .map(|s| json!({"name": s.name, "section": s.section}))
                    .collect::<Vec<_>>(),
                "items": catalog::test_items(),
            });
            write_json_line(&payload)?;
        }
    }
    Ok(())
}

fn run_config(cli: &Cli, args: &ConfigArgs) -> Result<(), CliError> {
    match &args.command {
        None | Some(ConfigCommand::Path) => {
            let path = cli.config.clone().unwrap_or_else(Config::default_path);
            let exists = path.exists();

            match output_mode(cli) {
                OutputMode::Human => {
                    println!("{}", path.display());
                    if !exists {
                        println!("  (file does not exist; defaults will be used)");
                    }
                }
                OutputMode::Json => {
                    let payload = json!({
                        "command": "config path",
                        "path": path.to_string_lossy(),
                        "exists": exists,
                    });
                    write_json_line(&payload)?;
                }
            }
            Ok(())
        }
        Some(ConfigCommand::Show) => {
            let config = Config::load(cli.config.as_deref())?;

            match output_mode(cli) {
                OutputMode::Human => {
                    let toml_str = toml::to_string_pretty(&config)
                        .map_err(|e| CliError::Internal(format!("serialize config: {e}")))?;
                    println!("{toml_str}");
                }
                OutputMode::Json => {
                    let value = serde_json::to_value(&config)?;
                    let payload = json!({
                        "command": "config show",
                        "config": value,
                    });
                    write_json_line(&payload)?;
                }
            }
            Ok(())
        }
        Some(ConfigCommand::Validate) => match Config::load(cli.config.as_deref()) {
            Ok(config) => {
                let hash = config.stable_hash()?;

                match output_mode(cli) {
                    OutputMode::Human => {
                        println!("Configuration is valid.");
                        println!("  Source: {}", config.paths.config_file.display());
                        println!("  Hash: {hash}");
                    }
                    OutputMode::Json => {
                        let payload = json!({
                            "command": "config validate",
                            "valid": true,
                            "path": config.paths.config_file.to_string_lossy(),
                            "hash": hash,
                        });
                        write_json_line(&payload)?;
                    }
                }
                Ok(())
            }
            Err(e) => {
                match output_mode(cli) {
                    OutputMode::Human => {
                        eprintln!("Configuration is INVALID: {e}");
                    }
                    OutputMode::Json => {
                        let payload = json!({
                            "command": "config validate",
                            "valid": false,
                            "code": e.code(),
                            "error": e.to_string(),
                        });
                        write_json_line(&payload)?;
                    }
                }
                Err(CliError::User(format!("invalid config: {e}")))
            }
        },
    }
}

// ---------------------------------------------------------------------------
// output
// ---------------------------------------------------------------------------

fn write_json_line(payload: &Value) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, payload)?;
    writeln!(stdout)?;
    Ok(())
}

fn output_mode(cli: &Cli) -> OutputMode {
    let env_mode = std::env::var("VCC_OUTPUT_FORMAT").ok();
    resolve_output_mode(cli.json, env_mode.as_deref(), io::stdout().is_terminal())
}

fn resolve_output_mode(json_flag: bool, env_mode: Option<&str>, stdout_is_tty: bool) -> OutputMode {
    if json_flag {
        return OutputMode::Json;
    }

    let fallback = if stdout_is_tty {
        OutputMode::Human
    } else {
        OutputMode::Json
    };

    match env_mode
        .map(str::trim)
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("json") => OutputMode::Json,
        Some("human") => OutputMode::Human,
        _ => fallback,
    }
}
