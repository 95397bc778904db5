//! Backup system for Orbit
//!
//! Provides container creation and restore on top of the shared
//! configuration handle.
//!
//! # Architecture
//!
//! The backup system consists of two main components:
//!
//! - `BackupManager`: registers the configured roots, builds the container in
//!   memory, encrypts it when policy requires, and writes it atomically
//! - `RestoreManager`: opens a container (decrypting with an explicit key) and
//!   extracts the configured groups
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use orbit::backup::{BackupManager, BackupOptions, RestoreManager};
//! use orbit::config::{ConfigManager, OrbitPaths};
//!
//! let paths = OrbitPaths::new()?;
//! let config = Arc::new(ConfigManager::open(&paths)?);
//!
//! let report = BackupManager::new(Arc::clone(&config)).create_backup(&BackupOptions::default())?;
//!
//! // Later, restore from backup
//! let result = RestoreManager::new(config).restore_from_file(&report.path, Some(key_path))?;
//! println!("{}", result.summary());
//! ```

mod manager;
mod restore;

pub use manager::{BackupManager, BackupOptions, BackupReport, DEFAULT_BACKUP_FILE};
pub use restore::{inspect_container, open_container, ContainerInfo, RestoreManager};
