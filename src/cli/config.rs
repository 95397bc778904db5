//! Configuration CLI commands
//!
//! Implements `config show`, `config set`, `config validate` and
//! `config repair`.

use std::sync::Arc;

use clap::Subcommand;

use crate::config::{ConfigKey, ConfigManager, OrbitPaths};
use crate::crypto::default_prefix;
use crate::display::{format_config, format_issues};
use crate::error::OrbitResult;

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the current configuration
    Show,

    /// Set a single configuration value
    Set {
        /// One of: backup-path, encryption-enabled, public-key-path,
        /// private-key-path, include-store-apps, auto-update-list, backup-setting
        key: String,
        /// New value (booleans accept true/1/yes)
        value: String,
    },

    /// Report configuration problems
    Validate,

    /// Fix common configuration problems
    Repair,
}

/// Handle a config command
pub fn handle_config_command(
    paths: &OrbitPaths,
    config: &Arc<ConfigManager>,
    cmd: ConfigCommands,
) -> OrbitResult<()> {
    match cmd {
        ConfigCommands::Show => {
            let current = config.get()?;
            println!("{}", format_config(&current, config.config_path()));
        }

        ConfigCommands::Set { key, value } => {
            let key: ConfigKey = key.parse()?;
            config.set(key, &value)?;
            println!("Set {} = {}", key, value);
        }

        ConfigCommands::Validate => {
            let issues = config.get()?.validation_issues();
            println!("{}", format_issues(&issues));
        }

        ConfigCommands::Repair => {
            let mut search_dirs = vec![paths.keys_dir()];
            if let Ok(cwd) = std::env::current_dir() {
                search_dirs.push(cwd);
            }

            let repairs = config.repair(&search_dirs, &default_prefix())?;
            if repairs.is_empty() {
                println!("Nothing to repair.");
            } else {
                println!("Applied {} repair(s):", repairs.len());
                for repair in &repairs {
                    println!("  - {}", repair);
                }
            }

            let remaining = config.get()?.validation_issues();
            if !remaining.is_empty() {
                println!();
                println!("Remaining issues:");
                for issue in &remaining {
                    println!("  - {}", issue);
                }
            }
        }
    }

    Ok(())
}
