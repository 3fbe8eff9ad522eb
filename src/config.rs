//! Process-level configuration.
//!
//! Mirrors this codebase's usual `clap::Parser`-derived server config: a
//! small, flat set of flags with defaults matching the reference
//! implementation's constants (`N = 10`, `MAX_SLEEP = 10`).

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "suzuki-kazami",
    about = "Simulated distributed mutual exclusion over the Suzuki-Kasami broadcast token algorithm"
)]
pub struct Config {
    /// Number of sites participating in the simulation.
    #[arg(long, env = "SK_SITES", default_value_t = 10)]
    pub sites: usize,

    /// Upper bound, in seconds, for a site's random non-critical/critical
    /// section sleeps. The actual sleep is drawn uniformly from
    /// `[0, max_sleep_secs)`.
    #[arg(long, env = "SK_MAX_SLEEP_SECS", default_value_t = 10)]
    pub max_sleep_secs: u64,

    /// Directory the logging collaborator clears and recreates at startup.
    #[arg(long, env = "SK_LOG_DIR", default_value = "tmp")]
    pub log_dir: PathBuf,
}

impl Config {
    /// Reduce the CLI-facing config to the plain data the simulation core
    /// actually needs, decoupling it from `clap`/`std::env::args`.
    pub fn to_sim_config(&self) -> SimConfig {
        SimConfig {
            num_sites: self.sites,
            max_sleep: Duration::from_secs(self.max_sleep_secs),
            log_dir: self.log_dir.clone(),
        }
    }
}

/// Plain configuration for [`crate::wiring::spawn`], independent of `clap`.
/// Tests and embedders construct this directly.
#[derive(Debug, Clone)]
pub struct SimConfig {
    pub num_sites: usize,
    pub max_sleep: Duration,
    pub log_dir: PathBuf,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            num_sites: 10,
            max_sleep: Duration::from_secs(10),
            log_dir: PathBuf::from("tmp"),
        }
    }
}
