//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_path", &self.database_path)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("timer.db"),
        }
    }
}

impl Config {
    /// Loads configuration from default locations.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(None)
    }

    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (TIMER_*)
        figment = figment.merge(Env::prefixed("TIMER_"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for the timer.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("timer"))
}

/// Returns the platform-specific data directory for the timer.
///
/// On Linux: `~/.local/share/timer`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("timer"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirs_data_path_ends_with_timer() {
        let path = dirs_data_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "timer");
    }

    #[test]
    fn test_default_config_uses_data_dir_for_db() {
        let config = Config::default();
        let data_dir = dirs_data_path().unwrap();
        assert_eq!(config.database_path, data_dir.join("timer.db"));
    }

    #[test]
    fn test_explicit_config_file_overrides_default() {
        let temp = tempfile::tempdir().unwrap();
        let config_path = temp.path().join("config.toml");
        std::fs::write(&config_path, "database_path = \"/srv/timer/work.db\"\n").unwrap();

        let config = Config::load_from(Some(&config_path)).unwrap();
        assert_eq!(config.database_path, PathBuf::from("/srv/timer/work.db"));
    }

    #[test]
    fn test_missing_config_file_falls_back_to_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let config = Config::load_from(Some(&temp.path().join("absent.toml"))).unwrap();
        assert_eq!(config.database_path.file_name().unwrap(), "timer.db");
    }
}
