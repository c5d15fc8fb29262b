//! Bot configuration.
//!
//! TOML-backed, lenient: a missing or broken file logs a warning and falls
//! back to defaults so the agent always comes up.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

const DEFAULT_CONFIG_PATH: &str = "config/blockhand.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BotConfig {
    /// Address the line-JSON control server listens on.
    pub listen_addr: String,
    /// Seed for the headless demo world.
    pub world_seed: u64,
    /// Search radius for gather/harvest targets.
    pub gather_radius: f64,
    /// Search radius for existing crafting tables and furnaces.
    pub station_radius: f64,
    /// Seconds without furnace progress before a smelt gives up.
    pub smelt_no_progress_secs: u64,
    /// Hard ceiling on one smelting batch, seconds.
    pub smelt_hard_cap_secs: u64,
    /// Initial reconnect backoff after losing the world, seconds.
    pub reconnect_initial_secs: u64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:3300".to_string(),
            world_seed: 0,
            gather_radius: 64.0,
            station_radius: 32.0,
            smelt_no_progress_secs: 30,
            smelt_hard_cap_secs: 300,
            reconnect_initial_secs: 5,
        }
    }
}

impl BotConfig {
    /// Load from the default path.
    pub fn load() -> Self {
        Self::load_from_path(Path::new(DEFAULT_CONFIG_PATH))
    }

    /// Load from an explicit path, falling back to defaults on any error.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<BotConfig>(&contents) {
                Ok(config) => config,
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    BotConfig::default()
                }
            },
            Err(err) => {
                if err.kind() != std::io::ErrorKind::NotFound
                    || path != Path::new(DEFAULT_CONFIG_PATH)
                {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                }
                BotConfig::default()
            }
        }
    }

    /// Executor limits derived from this config.
    pub fn executor_config(&self) -> blockhand_agent::ExecutorConfig {
        blockhand_agent::ExecutorConfig {
            gather_radius: self.gather_radius,
            station_radius: self.station_radius,
            smelt_no_progress: std::time::Duration::from_secs(self.smelt_no_progress_secs),
            smelt_hard_cap: std::time::Duration::from_secs(self.smelt_hard_cap_secs),
            ..blockhand_agent::ExecutorConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = BotConfig::default();
        assert_eq!(config.listen_addr, "127.0.0.1:3300");
        assert_eq!(config.smelt_hard_cap_secs, 300);
    }

    #[test]
    fn partial_toml_keeps_defaults_for_the_rest() {
        let config: BotConfig = toml::from_str("gather_radius = 16.0").unwrap();
        assert_eq!(config.gather_radius, 16.0);
        assert_eq!(config.station_radius, 32.0);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = BotConfig::load_from_path(Path::new("/nonexistent/blockhand.toml"));
        assert_eq!(config.listen_addr, BotConfig::default().listen_addr);
    }

    #[test]
    fn executor_config_carries_the_overrides() {
        let config = BotConfig {
            smelt_no_progress_secs: 7,
            ..BotConfig::default()
        };
        let exec = config.executor_config();
        assert_eq!(exec.smelt_no_progress, std::time::Duration::from_secs(7));
        assert_eq!(exec.reach, 4.5);
    }
}
