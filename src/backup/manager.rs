//! Backup manager for Orbit
//!
//! Turns the configured group mappings into a container file: register the
//! roots, build the archive in memory, encrypt it when policy says so, then
//! write it in one atomic step.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::archive::{build_archive, BuildStats, Manifest, SoftwareList};
use crate::config::{ConfigManager, UserConfig};
use crate::crypto::{encrypt, load_public_key};
use crate::error::{OrbitError, OrbitResult};
use crate::mapping::DirectoryMapper;
use crate::storage::write_bytes_atomic;

/// File name used when no output path is given
pub const DEFAULT_BACKUP_FILE: &str = "backup.orbit";

/// Per-invocation overrides
#[derive(Debug, Clone, Default)]
pub struct BackupOptions {
    /// Output file; defaults to `backup.orbit` in the configured backup path
    pub output: Option<PathBuf>,
    /// Pre-generated software inventory to embed
    pub inventory: Option<PathBuf>,
    /// Encrypt for this public key regardless of configuration
    pub public_key: Option<PathBuf>,
}

/// What a backup produced
#[derive(Debug, Clone)]
pub struct BackupReport {
    pub path: PathBuf,
    pub encrypted: bool,
    pub size_bytes: u64,
    pub stats: BuildStats,
    /// Groups with at least one archived root
    pub groups: Vec<String>,
    /// Configured roots that did not exist
    pub skipped_roots: Vec<PathBuf>,
    pub manifest: Manifest,
    pub inventory_count: Option<usize>,
}

/// Creates backup containers from the shared configuration
pub struct BackupManager {
    config: Arc<ConfigManager>,
}

impl BackupManager {
    /// Create a new BackupManager
    pub fn new(config: Arc<ConfigManager>) -> Self {
        Self { config }
    }

    /// Create a backup of every configured group
    pub fn create_backup(&self, options: &BackupOptions) -> OrbitResult<BackupReport> {
        let config = self.config.get()?;

        let (mapper, skipped_roots) = register_roots(&config)?;
        if mapper.is_empty() {
            warn!("No configured directory exists; the backup will only contain metadata");
        }

        let (inventory, inventory_count) = match &options.inventory {
            Some(path) => {
                let (bytes, count) = read_inventory(path)?;
                (Some(bytes), Some(count))
            }
            None => (None, None),
        };

        let manifest = Manifest::capture();
        let archive = build_archive(&mapper, &manifest, inventory.as_deref())?;

        let public_key_path = encryption_key_path(&config, options.public_key.as_deref())?;
        let (bytes, encrypted) = match &public_key_path {
            Some(path) => {
                info!(public_key = %path.display(), "Encrypting backup");
                let public_key = load_public_key(path)?;
                (encrypt(&archive.bytes, &public_key)?, true)
            }
            None => (archive.bytes, false),
        };

        let path = options
            .output
            .clone()
            .unwrap_or_else(|| config.system.default_backup_path.join(DEFAULT_BACKUP_FILE));
        write_bytes_atomic(&path, &bytes)?;
        info!(path = %path.display(), encrypted, size = bytes.len(), "Backup written");

        if let Err(e) = self.config.record_backup() {
            warn!("Failed to update backup statistics: {}", e);
        }

        Ok(BackupReport {
            path,
            encrypted,
            size_bytes: bytes.len() as u64,
            stats: archive.stats,
            groups: mapper.group_names().into_iter().map(String::from).collect(),
            skipped_roots,
            manifest,
            inventory_count,
        })
    }
}

/// Register every configured root, skipping the ones that do not exist
fn register_roots(config: &UserConfig) -> OrbitResult<(DirectoryMapper, Vec<PathBuf>)> {
    let mut mapper = DirectoryMapper::new();
    let mut skipped = Vec::new();

    if !config.vscode.backup_setting {
        info!("Configuration directory backup is disabled");
        return Ok((mapper, skipped));
    }

    for mapping in &config.vscode.config_dirs {
        match mapper.register(mapping.clone()) {
            Ok(_) => {}
            Err(e) if e.is_not_found() => {
                warn!(group = %mapping.name, "Skipping: {}", e);
                skipped.push(mapping.path.clone());
            }
            Err(e) => return Err(e),
        }
    }
    Ok((mapper, skipped))
}

fn read_inventory(path: &Path) -> OrbitResult<(Vec<u8>, usize)> {
    let bytes = std::fs::read(path).map_err(|e| {
        OrbitError::Io(format!("Failed to read inventory {}: {}", path.display(), e))
    })?;
    let list = SoftwareList::from_json(&bytes)?;
    Ok((bytes, list.total_count))
}

/// Public key to encrypt with, or `None` for a plain container
fn encryption_key_path(config: &UserConfig, explicit: Option<&Path>) -> OrbitResult<Option<PathBuf>> {
    if let Some(path) = explicit {
        return Ok(Some(path.to_path_buf()));
    }
    if !config.encryption.enabled {
        return Ok(None);
    }
    if config.encryption.public_key_path.trim().is_empty() {
        return Err(OrbitError::Config(
            "Encryption is enabled but no public key is configured; run `orbit gen-keys` or `orbit config repair`".into(),
        ));
    }
    Ok(Some(PathBuf::from(&config.encryption.public_key_path)))
}
