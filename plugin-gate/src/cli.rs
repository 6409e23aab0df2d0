//! Command-line interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Apply the plugin signature policy to a plugin inventory.
#[derive(Parser, Debug)]
#[command(name = "plugin-gate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log: Option<String>,

    /// Specify alternate configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate every plugin of an inventory file
    Check {
        /// Inventory file (TOML, one [[plugin]] table per plugin)
        inventory: PathBuf,

        /// Output in JSON format
        #[arg(long)]
        json: bool,

        /// Reject all unsigned plugins, even in development mode
        #[arg(long)]
        strict: bool,

        /// Exit with a non-zero status if any plugin is rejected
        #[arg(long)]
        fail_on_reject: bool,
    },

    /// Print the effective configuration
    Config,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_check() {
        let cli = Cli::try_parse_from([
            "plugin-gate",
            "--log",
            "debug",
            "check",
            "plugins.toml",
            "--strict",
            "--fail-on-reject",
        ])
        .unwrap();

        assert_eq!(cli.log.as_deref(), Some("debug"));
        match cli.command {
            Command::Check {
                inventory,
                json,
                strict,
                fail_on_reject,
            } => {
                assert_eq!(inventory, PathBuf::from("plugins.toml"));
                assert!(!json);
                assert!(strict);
                assert!(fail_on_reject);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_check_requires_inventory() {
        assert!(Cli::try_parse_from(["plugin-gate", "check"]).is_err());
    }
}
