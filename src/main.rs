//! rink-schedule - command-line front end
//!
//! Loads a scenario file, solves it, and prints the schedule as a text
//! listing or as JSON. Logs go to stderr; set `RUST_LOG` to adjust.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rink_schedule::lp::{write_lp, LinearModel};
use rink_schedule::models::Schedule;
use rink_schedule::{LeagueScheduler, Scenario, ScheduleError, ScheduleKpi};

#[derive(Parser, Debug)]
#[command(name = "rink-schedule", version, about = "Preference-driven league game scheduler")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Solve a scenario and print the schedule
    Solve {
        /// Scenario file (TOML, or JSON with a .json extension)
        scenario: PathBuf,

        /// Solver time limit in seconds, fractions allowed (overrides the scenario)
        #[arg(long)]
        time_limit: Option<f64>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Also write the model in LP format to this path
        #[arg(long)]
        write_lp: Option<PathBuf>,
    },

    /// Validate a scenario and its feasibility preconditions without solving
    Check {
        /// Scenario file
        scenario: PathBuf,
    },

    /// Write the model in CPLEX LP format
    ExportLp {
        /// Scenario file
        scenario: PathBuf,

        /// Output path (stdout if omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    schedule: &'a Schedule,
    kpi: &'a ScheduleKpi,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        match e.downcast_ref::<ScheduleError>() {
            Some(err) if err.is_no_schedule() => {
                eprintln!("no schedule: {err}");
                if err.is_retryable() {
                    eprintln!("hint: retry with a larger --time-limit");
                }
            }
            _ => eprintln!("error: {e:#}"),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Solve {
            scenario,
            time_limit,
            format,
            write_lp: lp_path,
        } => solve(&scenario, time_limit, format, lp_path.as_deref()),
        Command::Check { scenario } => check(&scenario),
        Command::ExportLp { scenario, output } => export(&scenario, output.as_deref()),
    }
}

fn load(path: &Path, time_limit: Option<f64>) -> Result<LeagueScheduler> {
    let mut scenario = Scenario::load(path)?;
    if time_limit.is_some() {
        scenario.settings.time_limit_secs = time_limit;
    }
    let scheduler = LeagueScheduler::from_scenario(&scenario)?;
    Ok(scheduler)
}

fn solve(
    path: &Path,
    time_limit: Option<f64>,
    format: OutputFormat,
    lp_path: Option<&Path>,
) -> Result<()> {
    let scheduler = load(path, time_limit)?;
    let model = scheduler.build_model()?;
    if let Some(lp_path) = lp_path {
        write_model(&model, Some(lp_path))?;
    }

    let solver = scheduler.default_solver();
    let schedule = scheduler.solve_model(&model, &solver)?;
    let kpi = ScheduleKpi::calculate(&schedule, scheduler.catalog().len());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Text => {
            writeln!(out, "{schedule}")?;
            writeln!(
                out,
                "Total cost: {:.2}  (mean venue rank {:.2}, mean time rank {:.2})",
                kpi.total_cost, kpi.avg_venue_rank, kpi.avg_band_rank
            )?;
        }
        OutputFormat::Json => {
            let report = JsonReport {
                schedule: &schedule,
                kpi: &kpi,
            };
            serde_json::to_writer_pretty(&mut out, &report)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

fn check(path: &Path) -> Result<()> {
    let scheduler = load(path, None)?;
    let model = scheduler.build_model()?;
    println!(
        "ok: {} teams, {} slots, {} decisions, {} constraints",
        scheduler.roster().len(),
        scheduler.catalog().len(),
        model.decision_count(),
        model.constraint_count()
    );
    Ok(())
}

fn export(path: &Path, output: Option<&Path>) -> Result<()> {
    let scheduler = load(path, None)?;
    let model = scheduler.build_model()?;
    write_model(&model, output)
}

fn write_model(model: &LinearModel, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            write_lp(model, &mut writer)?;
            writer.flush()?;
            info!(path = %path.display(), "wrote LP model");
        }
        None => write_lp(model, io::stdout().lock())?,
    }
    Ok(())
}
