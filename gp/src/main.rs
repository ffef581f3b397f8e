//! gp - goal planner
//!
//! CLI entry point: loads config and snapshot, runs the assistant or the
//! engine, prints the result and saves what changed.

use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use tracing::{debug, info};

use goalplanner::assistant::Assistant;
use goalplanner::cli::{Cli, Command};
use goalplanner::config::Config;
use goalplanner::domain::StepId;
use goalplanner::engine::{BusyPeriod, DayLoad, ReflowOutcome, build_load_index, find_next_free_date};
use goalplanner::store::SnapshotStore;

fn setup_logging(verbose: bool) -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("goalplanner")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    let log_file = fs::File::create(log_dir.join("gp.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    let snapshot_path = cli.snapshot.clone().unwrap_or_else(|| config.storage.snapshot_path.clone());
    let store = SnapshotStore::open(snapshot_path);
    let local_today = chrono::Local::now().date_naive();

    debug!(command = ?cli.command, snapshot = %store.path().display(), "main: dispatching command");
    match cli.command {
        Command::Load { from } => cmd_load(&store, from),
        Command::Goal { request, today } => {
            cmd_goal(&config, &store, &request.join(" "), today.unwrap_or(local_today)).await
        }
        Command::Reschedule {
            problem,
            from,
            to,
            today,
            dry_run,
        } => {
            let busy = from.map(|from| BusyPeriod::new(from, to.unwrap_or(from)));
            let today = today.unwrap_or(local_today);
            cmd_reschedule(&config, &store, &problem.join(" "), busy, today, dry_run).await
        }
        Command::FreeDate { date, exclude } => cmd_free_date(&store, date, exclude),
        Command::Progress => cmd_progress(&store),
    }
}

fn cmd_load(store: &SnapshotStore, from: Option<NaiveDate>) -> Result<()> {
    let snapshot = store.load()?;
    let load = build_load_index(&snapshot.steps);
    if load.is_empty() {
        println!("{}", "No scheduled steps".dimmed());
        return Ok(());
    }

    let entries = load.entries(from);
    if entries.is_empty() {
        let from = from.map(|d| d.to_string()).unwrap_or_default();
        println!("{}", format!("No scheduled steps from {}", from).dimmed());
        return Ok(());
    }
    for entry in entries {
        println!("{}  {}", entry.date.to_string().cyan(), entry.tasks_count);
    }
    Ok(())
}

async fn cmd_goal(config: &Config, store: &SnapshotStore, request: &str, today: NaiveDate) -> Result<()> {
    let mut snapshot = store.load()?;
    let assistant = Assistant::from_config(config);

    let plan = assistant
        .generate_goal(request, &snapshot.steps, today)
        .await
        .context("Failed to generate goal")?;

    let goal_id = snapshot.insert_goal(&plan);
    store.save(&snapshot)?;

    println!(
        "{} Created goal {} {}",
        "✓".green(),
        goal_id.to_string().yellow(),
        plan.title.bold()
    );
    for step in &plan.steps {
        let note = if step.was_moved() {
            format!(" (asked for {})", step.candidate).dimmed().to_string()
        } else {
            String::new()
        };
        println!("  {}  {}{}", step.date.to_string().cyan(), step.title, note);
    }
    Ok(())
}

async fn cmd_reschedule(
    config: &Config,
    store: &SnapshotStore,
    problem: &str,
    busy: Option<BusyPeriod>,
    today: NaiveDate,
    dry_run: bool,
) -> Result<()> {
    let mut snapshot = store.load()?;
    let assistant = Assistant::from_config(config);

    let report = match busy {
        Some(busy) => assistant.reschedule_within(busy, &snapshot.steps, today).await,
        None => assistant.reschedule(problem, &snapshot.steps, today).await,
    }
    .context("Failed to reschedule")?;
    println!(
        "Busy: {} {}",
        report.busy.to_string().yellow(),
        format!("({} advisor)", assistant.advisor_name()).dimmed()
    );

    let batch = match &report.outcome {
        ReflowOutcome::NothingToReschedule { from } => {
            println!("{}", format!("Nothing to reschedule from {}", from).dimmed());
            return Ok(());
        }
        ReflowOutcome::Rescheduled(batch) => batch,
    };

    for assignment in &batch.assignments {
        let title = snapshot
            .steps
            .iter()
            .find(|s| s.id == assignment.id)
            .map(|s| s.title.as_str())
            .unwrap_or("");
        println!(
            "  {} {}  {}",
            assignment.id.to_string().yellow(),
            assignment.date.to_string().cyan(),
            title
        );
    }
    for skipped in &batch.skipped {
        let id = skipped.task_id.map(|id| id.to_string()).unwrap_or_else(|| "?".to_string());
        println!("  {} {} skipped: {}", "!".red(), id, skipped.reason);
    }

    if dry_run {
        println!("{}", "Dry run, nothing saved".dimmed());
        return Ok(());
    }

    let applied = snapshot.apply(&batch.assignments);
    store.save(&snapshot)?;
    println!("{} Moved {} step(s)", "✓".green(), applied);
    Ok(())
}

fn cmd_free_date(store: &SnapshotStore, date: NaiveDate, exclude: Option<StepId>) -> Result<()> {
    let snapshot = store.load()?;
    let busy = DayLoad::build_excluding(&snapshot.steps, exclude).occupied_dates();
    println!("{}", find_next_free_date(&busy, date));
    Ok(())
}

fn cmd_progress(store: &SnapshotStore) -> Result<()> {
    let snapshot = store.load()?;
    if snapshot.goals.is_empty() {
        println!("{}", "No goals".dimmed());
        return Ok(());
    }
    for goal in &snapshot.goals {
        let percent = goal.progress(&snapshot.steps);
        let shown = format!("{:>3}%", percent);
        let shown = if percent == 100 { shown.green() } else { shown.normal() };
        println!("{} {} {}", shown, goal.id.to_string().yellow(), goal.title);
    }
    Ok(())
}
