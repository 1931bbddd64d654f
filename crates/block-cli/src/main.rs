//! `timeblock` CLI - turn per-day task lists into dated time-tracking entries.
//!
//! ## Usage
//!
//! ```sh
//! # Schedule every configured client, print entries as CSV on stdout
//! timeblock schedule --config config.toml --tasks horarios.csv
//!
//! # Schedule one client and write time_entries_<client>.json into a directory
//! timeblock schedule -c config.toml -t horarios.csv --client Globex --format json -o out/
//!
//! # Show the blocked periods and free blocks of one day
//! timeblock blocks -c config.toml --client Globex --day 5
//!
//! # Debug logging, as JSON lines on stderr
//! RUST_LOG=block_engine=debug timeblock --json-logs schedule -c config.toml -t horarios.csv
//! ```
//!
//! Setting `[logging] file` in the config also writes every event at or
//! above `[logging] file_level` (default `debug`) to that file.

mod config;
mod export;
mod tasks;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use block_engine::{
    available_blocks, blocked_periods, find_overlaps, format_hours, schedule_client, PeriodKind,
};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::{ClientConfig, Config};
use crate::export::{export_entries, write_client_csv, write_export, ExportEntry, ExportFormat};
use crate::tasks::{read_tasks, tasks_for_client, unknown_clients};

#[derive(Parser)]
#[command(
    name = "timeblock",
    version,
    about = "Allocate daily tasks into time-tracking entries"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level filter (overrides the config file; RUST_LOG overrides both)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Schedule tasks and export the resulting entries
    Schedule {
        /// TOML configuration file
        #[arg(short, long)]
        config: PathBuf,
        /// Task file: CSV with a Cliente,Tarea,Dia header, or a .json array
        #[arg(short, long)]
        tasks: PathBuf,
        /// Only schedule this client
        #[arg(long)]
        client: Option<String>,
        /// Write one time_entries_<client> file per client here (stdout if omitted)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        /// Export format
        #[arg(short, long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,
    },
    /// Print the blocked periods and available blocks of one day
    Blocks {
        /// TOML configuration file
        #[arg(short, long)]
        config: PathBuf,
        /// Client whose calendar to use
        #[arg(long)]
        client: String,
        /// Day of the configured month
        #[arg(long)]
        day: u32,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Schedule {
            config,
            tasks,
            client,
            output_dir,
            format,
        } => {
            let config = Config::from_file(&config)?;
            init_logging(cli.log_level.as_deref(), &config, cli.json_logs)?;
            run_schedule(&config, &tasks, client.as_deref(), output_dir, format)
        }
        Commands::Blocks {
            config,
            client,
            day,
        } => {
            let config = Config::from_file(&config)?;
            init_logging(cli.log_level.as_deref(), &config, cli.json_logs)?;
            run_blocks(&config, &client, day)
        }
    }
}

/// Install the global subscriber.
///
/// The console layer writes to stderr filtered by `RUST_LOG`, then
/// `--log-level`, then `[logging] level`, then `info`. When `[logging] file`
/// is set, a second layer appends timestamped events to that file at
/// `[logging] file_level`.
fn init_logging(cli_level: Option<&str>, config: &Config, json: bool) -> Result<()> {
    let fallback = cli_level
        .or(config.logging.level.as_deref())
        .unwrap_or("info");
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let console = if json {
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer().with_writer(std::io::stderr).boxed()
    };

    let file = match &config.logging.file {
        Some(path) => {
            let level: LevelFilter = config
                .logging
                .file_level
                .parse()
                .with_context(|| format!("Invalid log file level: '{}'", config.logging.file_level))?;
            let layer = fmt::layer()
                .with_ansi(false)
                .with_writer(file_appender(path)?)
                .with_filter(level);
            Some(layer)
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console.with_filter(console_filter))
        .with(file)
        .init();
    Ok(())
}

/// Append-only writer for `path`, creating its directory when missing.
fn file_appender(path: &Path) -> Result<RollingFileAppender> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let name = path
        .file_name()
        .with_context(|| format!("Log file has no file name: {}", path.display()))?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name.to_string_lossy())
        .build(dir)
        .with_context(|| format!("Failed to open log file: {}", path.display()))
}

fn select_clients<'a>(config: &'a Config, only: Option<&str>) -> Result<Vec<&'a ClientConfig>> {
    match only {
        Some(name) => {
            let client = config
                .client(name)
                .with_context(|| format!("Unknown client: '{}'", name))?;
            Ok(vec![client])
        }
        None => Ok(config.workspace.clients.iter().collect()),
    }
}

fn run_schedule(
    config: &Config,
    tasks_path: &Path,
    only: Option<&str>,
    output_dir: Option<PathBuf>,
    format: ExportFormat,
) -> Result<()> {
    info!(workspace = %config.workspace.name, "scheduling");

    let tz = config.time.timezone()?;
    let period = config.time.period();
    period.validate().context("Invalid [time] period")?;

    let records = read_tasks(tasks_path)?;
    for name in unknown_clients(&records, config) {
        warn!(client = name, "tasks reference a client missing from the config");
    }

    let mut stdout_report: Vec<(String, Vec<ExportEntry>)> = Vec::new();

    for client in select_clients(config, only)? {
        let tasks = tasks_for_client(&records, &client.name);
        if tasks.is_empty() {
            warn!(client = %client.name, "no tasks found for client");
            continue;
        }
        info!(client = %client.name, tasks = tasks.len(), "found tasks");

        let calendar = client
            .to_calendar(&config.time)
            .with_context(|| format!("Invalid calendar for client '{}'", client.name))?;
        let schedule = schedule_client(&calendar, &period, &tasks)
            .with_context(|| format!("Failed to schedule client '{}'", client.name))?;

        for overlap in find_overlaps(&schedule.entries) {
            warn!(
                client = %client.name,
                first = %overlap.first.description,
                second = %overlap.second.description,
                start = %overlap.first.start,
                minutes = overlap.overlap_minutes,
                "overlapping entries"
            );
        }

        if schedule.entries.is_empty() {
            warn!(client = %client.name, "no time entries generated");
            continue;
        }
        info!(
            client = %client.name,
            entries = schedule.entries.len(),
            meetings = schedule.meeting_entries,
            dropped_tasks = schedule.dropped_tasks,
            ignored_tasks = schedule.ignored_tasks,
            "generated time entries"
        );

        let rows = export_entries(&schedule.entries, tz)?;
        match &output_dir {
            Some(dir) => {
                let path = write_export(dir, &client.name, &rows, format)?;
                info!(client = %client.name, path = %path.display(), "entries saved");
            }
            None => stdout_report.push((client.name.clone(), rows)),
        }
    }

    if output_dir.is_none() {
        print_report(&stdout_report, format)?;
    }

    Ok(())
}

/// Stdout report: one CSV with a `client` column, or a JSON object keyed by
/// client name.
fn print_report(report: &[(String, Vec<ExportEntry>)], format: ExportFormat) -> Result<()> {
    match format {
        ExportFormat::Csv => write_client_csv(std::io::stdout().lock(), report),
        ExportFormat::Json => {
            let mut object = serde_json::Map::new();
            for (client, rows) in report {
                object.insert(client.clone(), serde_json::to_value(rows)?);
            }
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::Value::Object(object))?
            );
            Ok(())
        }
    }
}

fn run_blocks(config: &Config, name: &str, day: u32) -> Result<()> {
    let client = config
        .client(name)
        .with_context(|| format!("Unknown client: '{}'", name))?;
    let calendar = client
        .to_calendar(&config.time)
        .with_context(|| format!("Invalid calendar for client '{}'", client.name))?;
    calendar.validate()?;
    let date = config.time.period().date_of(day)?;

    println!("Blocked periods for {} on {}:", client.name, date);
    for period in blocked_periods(date, &calendar) {
        let kind = match period.kind {
            PeriodKind::Lunch => "lunch",
            PeriodKind::Meeting => "meeting",
        };
        let span = format!("{} - {}", format_hours(period.start), format_hours(period.end));
        match &period.description {
            Some(description) => println!("  {kind:<8} {span}  {description}"),
            None => println!("  {kind:<8} {span}"),
        }
    }

    println!("Available blocks:");
    for block in available_blocks(date, &calendar)? {
        println!("  {} - {}", format_hours(block.start), format_hours(block.end));
    }

    Ok(())
}
