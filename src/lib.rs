//! Orbit - editor configuration backup and restore
//!
//! This library packs a set of configuration directories into a single
//! ZIP container, optionally sealed in a hybrid RSA-OAEP/AES-256-GCM
//! envelope, and restores that container onto another machine.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Paths, the persisted user configuration and its manager
//! - `error`: Custom error types
//! - `mapping`: Relative paths and group-to-directory mapping
//! - `archive`: ZIP container building, reading and extraction
//! - `crypto`: The encryption envelope and RSA key management
//! - `backup`: Save and restore orchestration
//! - `storage`: Atomic file writes
//! - `display`: Terminal formatting
//! - `cli`: Command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use orbit::backup::{BackupManager, BackupOptions};
//! use orbit::config::{ConfigManager, OrbitPaths};
//!
//! let paths = OrbitPaths::new()?;
//! let config = Arc::new(ConfigManager::open(&paths)?);
//! let report = BackupManager::new(config).create_backup(&BackupOptions::default())?;
//! ```

pub mod archive;
pub mod backup;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod display;
pub mod error;
pub mod mapping;
pub mod storage;

pub use error::{OrbitError, OrbitResult};
