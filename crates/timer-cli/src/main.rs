use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use timer_cli::commands::{info, start, status, stop};
use timer_cli::{Cli, Commands, Config};
use timer_core::TimerService;
use timer_db::Database;

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<Database> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    Database::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Logs go to stderr so command output stays clean on stdout
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let service = TimerService::new(open_database(cli.config.as_deref())?);
    let mut stdout = io::stdout().lock();

    let outcome = match command {
        Commands::Start(employee) => start::run(&mut stdout, &service, &employee.id),
        Commands::Stop(employee) => stop::run(&mut stdout, &service, &employee.id),
        Commands::Info { employee, json } => info::run(&mut stdout, &service, &employee.id, *json),
        Commands::Status(employee) => status::run(&mut stdout, &service, &employee.id),
    };

    let closed = service.into_store().close();
    outcome?;
    closed.context("failed to close database")
}
