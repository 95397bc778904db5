//! Key generation CLI command

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Args;
use tracing::warn;

use crate::config::settings::DEFAULT_ALGORITHM;
use crate::config::{ConfigManager, OrbitPaths};
use crate::crypto::{default_prefix, KeyManager, KeyPairPaths};
use crate::error::{OrbitError, OrbitResult};

/// Arguments for `orbit gen-keys`
#[derive(Args, Debug)]
pub struct GenKeysArgs {
    /// File name prefix (defaults to the current user name)
    #[arg(short, long)]
    pub prefix: Option<String>,

    /// Directory for the key files (defaults to the Orbit keys directory)
    #[arg(short, long)]
    pub dir: Option<PathBuf>,

    /// Replace an existing key pair without asking
    #[arg(short, long)]
    pub force: bool,

    /// Do not point the configuration at the new keys
    #[arg(long)]
    pub no_config: bool,
}

/// Handle `orbit gen-keys`
pub fn handle_gen_keys_command(
    paths: &OrbitPaths,
    config: &Arc<ConfigManager>,
    args: GenKeysArgs,
) -> OrbitResult<()> {
    let prefix = args.prefix.unwrap_or_else(default_prefix);
    let dir = absolutize(&args.dir.unwrap_or_else(|| paths.keys_dir()))?;
    let manager = KeyManager::new(&dir);
    let force = args.force;

    let confirm = |existing: &KeyPairPaths| -> bool {
        force || prompt_overwrite(existing).unwrap_or(false)
    };

    println!("Generating RSA-2048 key pair...");
    let (_, key_paths) = manager.create(&prefix, &confirm)?;

    println!("Private key: {}", key_paths.private_key.display());
    println!("Public key:  {}", key_paths.public_key.display());
    println!();
    println!("Keep the private key safe: encrypted backups cannot be restored without it.");

    if args.no_config {
        return Ok(());
    }

    let public_key = key_paths.public_key.display().to_string();
    let private_key = key_paths.private_key.display().to_string();
    let updated = config.update(|c| {
        c.encryption.enabled = true;
        c.encryption.public_key_path = public_key;
        c.encryption.private_key_path = private_key;
        c.encryption.default_algorithm = DEFAULT_ALGORITHM.to_string();
    });
    match updated {
        Ok(()) => println!("Encryption enabled with the new key pair."),
        Err(e) => warn!("Keys were saved but the configuration was not updated: {}", e),
    }
    Ok(())
}

fn prompt_overwrite(existing: &KeyPairPaths) -> OrbitResult<bool> {
    println!("A key pair with this prefix already exists:");
    println!("  {}", existing.private_key.display());
    println!("  {}", existing.public_key.display());
    println!("Backups encrypted with the old public key will need the old private key.");
    print!("Overwrite it? (yes/no): ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn absolutize(path: &Path) -> OrbitResult<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir()
        .map_err(|e| OrbitError::Io(format!("Failed to read current directory: {}", e)))?;
    Ok(cwd.join(path))
}
