//! Employee timer CLI library.
//!
//! This crate provides the CLI interface for the timer service.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, Employee};
pub use config::Config;
