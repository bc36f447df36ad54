//! Environment-derived configuration shared by the web and daemon binaries.

use std::path::PathBuf;
use std::time::Duration;

/// Runtime settings, read from `EMBERFALL_*` environment variables with
/// sensible defaults. Binaries load a `.env` file first via dotenvy.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the save file and the daemon's JSON files.
    pub data_dir: PathBuf,
    /// Address the web API binds to.
    pub bind_addr: String,
    /// Seconds between heals for a registered hero.
    pub heal_interval: Duration,
    /// HP restored per heal tick.
    pub heal_amount: i32,
    /// Seconds between passive-mode sweeps and command polls.
    pub sweep_interval: Duration,
    /// Back-off after an unexpected error in a heal loop.
    pub retry_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            bind_addr: "0.0.0.0:8000".to_string(),
            heal_interval: Duration::from_secs(30),
            heal_amount: 1,
            sweep_interval: Duration::from_secs(30),
            retry_interval: Duration::from_secs(5),
        }
    }
}

fn env_u64(name: &str) -> Option<u64> {
    std::env::var(name).ok()?.parse().ok()
}

impl Config {
    /// Build from the environment, falling back to defaults per variable.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(dir) = std::env::var("EMBERFALL_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Ok(addr) = std::env::var("EMBERFALL_BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Some(secs) = env_u64("EMBERFALL_HEAL_INTERVAL_SECS") {
            config.heal_interval = Duration::from_secs(secs);
        }
        if let Some(amount) = env_u64("EMBERFALL_HEAL_AMOUNT") {
            config.heal_amount = amount as i32;
        }
        if let Some(secs) = env_u64("EMBERFALL_SWEEP_INTERVAL_SECS") {
            config.sweep_interval = Duration::from_secs(secs);
        }
        config
    }

    /// The versioned game save file.
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join("game.json")
    }

    /// Hero id -> last-heal timestamp, the daemon's restart state.
    pub fn state_path(&self) -> PathBuf {
        self.data_dir.join("healing_state.json")
    }

    /// Single-slot command file written by the web process.
    pub fn command_path(&self) -> PathBuf {
        self.data_dir.join("daemon_commands.json")
    }

    /// Status snapshot written by the daemon.
    pub fn status_path(&self) -> PathBuf {
        self.data_dir.join("daemon_status.json")
    }
}
