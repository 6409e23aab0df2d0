//! # plugin-gate
//!
//! Applies the plugin signature policy to an inventory of loaded plugins and
//! reports which of them may be activated.
//!
//! ## Configuration
//!
//! The gate reads configuration from `$XDG_CONFIG_HOME/plugin-gate/config.toml`
//! unless `--config` is given. `PLUGIN_GATE_APP_MODE` and
//! `PLUGIN_GATE_ALLOW_UNSIGNED` override the file.
//!
//! ## Running
//!
//! ```bash
//! # Validate an inventory
//! cargo run --bin plugin-gate -- check plugins.toml
//!
//! # JSON report, non-zero exit on any rejection
//! cargo run --bin plugin-gate -- check plugins.toml --json --fail-on-reject
//!
//! # With debug logging
//! RUST_LOG=debug cargo run --bin plugin-gate -- check plugins.toml
//! ```

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing::{info, warn};

use plugin_gate::check::{check, CheckOptions};
use plugin_gate::cli::{Cli, Command};
use plugin_gate::config::Config;
use plugin_gate::inventory::Inventory;
use plugin_gate::telemetry::init_telemetry;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // The log level may come from the config file, so events about loading
    // it are held until the subscriber is installed.
    let (mut config, created, load_error) = match &cli.config {
        Some(path) => (Config::load(path)?, None, None),
        None => match Config::load_default() {
            Ok((config, created)) => (config, created, None),
            Err(e) => (Config::default(), None, Some(e)),
        },
    };
    config.apply_env_overrides()?;

    init_telemetry(cli.log.as_deref().unwrap_or(&config.log.level));
    info!("Starting plugin-gate v{}", env!("CARGO_PKG_VERSION"));
    if let Some(e) = load_error {
        warn!("Failed to load config, using defaults: {:#}", e);
    }
    if let Some(path) = created {
        info!("Created default configuration file at: {}", path.display());
    }

    match cli.command {
        Command::Check {
            inventory,
            json,
            strict,
            fail_on_reject,
        } => {
            let inventory = Inventory::load(&inventory)?;
            let report = check(&config, inventory, CheckOptions { strict })?;

            if json {
                println!("{}", report.to_json()?);
            } else {
                print!("{}", report.render_text());
            }

            if fail_on_reject && report.has_rejections() {
                return Ok(ExitCode::from(2));
            }
        }
        Command::Config => {
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(ExitCode::SUCCESS)
}
