use std::io::Write;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use suzuki_kazami::{config::Config, wiring};

fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::parse();
    tracing::info!(
        sites = config.sites,
        max_sleep_secs = config.max_sleep_secs,
        log_dir = %config.log_dir.display(),
        "starting simulation"
    );

    let simulation = wiring::spawn(config.to_sim_config())
        .context("failed to initialize simulation")?;
    tracing::info!(sites = simulation.sites.len(), "sites up and running");

    print!("Press any key to terminate...");
    std::io::stdout().flush().ok();
    let mut input = String::new();
    std::io::stdin()
        .read_line(&mut input)
        .context("failed to read from stdin")?;

    Ok(())
}

fn init_tracing() {
    let json_logs = std::env::var("SK_LOG_JSON").unwrap_or_default() == "1";
    let filter = EnvFilter::from_default_env().add_directive(
        "suzuki_kazami=info"
            .parse()
            .expect("static directive always parses"),
    );
    if json_logs {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
