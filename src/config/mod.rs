//! Configuration module for Orbit
//!
//! This module provides configuration management including:
//! - Per-user path resolution
//! - The persisted user configuration and its invariants
//! - The lock-guarded configuration manager

pub mod manager;
pub mod paths;
pub mod settings;

pub use manager::ConfigManager;
pub use paths::OrbitPaths;
pub use settings::{ConfigKey, EncryptionConfig, UserConfig};
