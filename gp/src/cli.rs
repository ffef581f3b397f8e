//! CLI command definitions

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::domain::StepId;

/// gp - goal planner with a date-scheduling engine
#[derive(Parser, Debug)]
#[command(name = "gp", author, version, about = "Break goals into dated steps and reschedule around busy days", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at DEBUG level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Snapshot file (overrides storage.snapshot-path)
    #[arg(short, long, global = true)]
    pub snapshot: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show how many steps are scheduled on each day
    Load {
        /// Only show days on or after this date
        #[arg(short, long)]
        from: Option<NaiveDate>,
    },

    /// Generate a new goal and place its steps
    Goal {
        /// What the user wants to achieve
        #[arg(required = true)]
        request: Vec<String>,

        /// Override the current date
        #[arg(short, long)]
        today: Option<NaiveDate>,
    },

    /// Move steps out of a busy period described in free text or given as dates
    Reschedule {
        /// What keeps the user busy, and when
        #[arg(required_unless_present = "from")]
        problem: Vec<String>,

        /// First busy day; skips reading the busy period from the problem text
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Last busy day (defaults to --from)
        #[arg(long, requires = "from")]
        to: Option<NaiveDate>,

        /// Override the current date
        #[arg(short, long)]
        today: Option<NaiveDate>,

        /// Show the plan without saving it
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// Print the first day on or after DATE with no steps
    FreeDate {
        /// Start of the search
        date: NaiveDate,

        /// Ignore this step when deciding which days are taken
        #[arg(short, long)]
        exclude: Option<StepId>,
    },

    /// Show the completion percentage of every goal
    Progress,
}
