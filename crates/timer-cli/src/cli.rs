//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Employee work timer.
///
/// Starts and stops one work timer per employee and shows the recorded
/// intervals.
#[derive(Debug, Parser)]
#[command(name = "timer", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the employee's timer.
    Start(Employee),

    /// Stop the employee's running timer.
    Stop(Employee),

    /// Show the employee's recorded intervals, most recent first.
    Info {
        #[command(flatten)]
        employee: Employee,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show whether the employee's timer is running.
    Status(Employee),
}

/// The employee a command applies to.
#[derive(Debug, Args)]
pub struct Employee {
    /// Employee identifier.
    #[arg(long = "id", value_name = "EMPLOYEE_ID")]
    pub id: String,
}
