//! Backup CLI commands
//!
//! Implements `save`, `restore` and `read`.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;

use crate::backup::{inspect_container, BackupManager, BackupOptions, RestoreManager};
use crate::config::ConfigManager;
use crate::display::{format_backup_report, format_container_info, format_restore_result};
use crate::error::OrbitResult;

/// Arguments for `orbit save`
#[derive(Args, Debug)]
pub struct SaveArgs {
    /// Output file (defaults to backup.orbit in the configured backup path)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Pre-generated software inventory (JSON) to embed
    #[arg(long)]
    pub inventory: Option<PathBuf>,

    /// Encrypt for this public key instead of the configured one
    #[arg(long)]
    pub public_key: Option<PathBuf>,
}

/// Arguments for `orbit restore`
#[derive(Args, Debug)]
pub struct RestoreArgs {
    /// Backup file to restore
    pub backup: PathBuf,

    /// Private key for encrypted backups
    #[arg(short, long)]
    pub key: Option<PathBuf>,
}

/// Arguments for `orbit read`
#[derive(Args, Debug)]
pub struct ReadArgs {
    /// Backup file to inspect
    pub backup: PathBuf,

    /// Private key for encrypted backups
    #[arg(short, long)]
    pub key: Option<PathBuf>,

    /// List every entry
    #[arg(short, long)]
    pub list: bool,
}

/// Handle `orbit save`
pub fn handle_save_command(config: &Arc<ConfigManager>, args: SaveArgs) -> OrbitResult<()> {
    println!("Creating backup...");
    let options = BackupOptions {
        output: args.output,
        inventory: args.inventory,
        public_key: args.public_key,
    };
    let report = BackupManager::new(Arc::clone(config)).create_backup(&options)?;
    print!("{}", format_backup_report(&report));
    Ok(())
}

/// Handle `orbit restore`
pub fn handle_restore_command(config: &Arc<ConfigManager>, args: RestoreArgs) -> OrbitResult<()> {
    println!("Restoring from {}...", args.backup.display());
    let result = RestoreManager::new(Arc::clone(config))
        .restore_from_file(&args.backup, args.key.as_deref())?;
    println!("Restore complete!");
    print!("{}", format_restore_result(&result));
    Ok(())
}

/// Handle `orbit read`
pub fn handle_read_command(args: ReadArgs) -> OrbitResult<()> {
    let info = inspect_container(&args.backup, args.key.as_deref())?;
    print!("{}", format_container_info(&info, args.list));
    Ok(())
}
