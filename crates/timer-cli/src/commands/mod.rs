//! CLI subcommand implementations.

pub mod info;
pub mod start;
pub mod status;
pub mod stop;
mod util;
