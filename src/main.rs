use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use orbit::cli::{
    handle_config_command, handle_gen_keys_command, handle_read_command, handle_restore_command,
    handle_save_command, ConfigCommands, GenKeysArgs, ReadArgs, RestoreArgs, SaveArgs,
};
use orbit::config::{ConfigManager, OrbitPaths};

#[derive(Parser)]
#[command(
    name = "orbit",
    version,
    about = "Back up and restore editor configuration directories",
    long_about = "Orbit packs editor configuration directories into a single ZIP \
                  container, optionally sealed with RSA-OAEP and AES-256-GCM, and \
                  restores them onto another machine."
)]
struct Cli {
    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a backup container from the configured directories
    Save(SaveArgs),

    /// Restore a backup container onto this machine
    Restore(RestoreArgs),

    /// Show what a backup container holds
    #[command(alias = "info")]
    Read(ReadArgs),

    /// Generate an RSA key pair for encrypted backups
    GenKeys(GenKeysArgs),

    /// Configuration commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    // Initialize paths and configuration
    let paths = OrbitPaths::new()?;
    paths.ensure_directories()?;
    let config = Arc::new(ConfigManager::open(&paths)?);

    match cli.command {
        Some(Commands::Save(args)) => handle_save_command(&config, args)?,
        Some(Commands::Restore(args)) => handle_restore_command(&config, args)?,
        Some(Commands::Read(args)) => handle_read_command(args)?,
        Some(Commands::GenKeys(args)) => handle_gen_keys_command(&paths, &config, args)?,
        Some(Commands::Config(cmd)) => handle_config_command(&paths, &config, cmd)?,
        None => {
            println!("Orbit - editor configuration backup");
            println!();
            println!("Config file: {}", config.config_path().display());
            println!();
            println!("Run 'orbit --help' for usage information.");
            println!("Run 'orbit save' to create a backup.");
        }
    }

    Ok(())
}
