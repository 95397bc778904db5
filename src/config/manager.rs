//! Concurrency-safe configuration store
//!
//! `ConfigManager` is constructed once at startup and shared as an
//! `Arc<ConfigManager>`. Reads hand out independent copies; updates run
//! copy -> mutate -> validate -> persist -> commit under one write lock, so
//! the file on disk always reflects some serial order of updates.

use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use tracing::{info, warn};

use super::paths::OrbitPaths;
use super::settings::{now_stamp, repair, ConfigKey, SystemConfig, UserConfig};
use crate::error::{OrbitError, OrbitResult};
use crate::storage::{read_json_required, write_json_atomic};

/// Owns the live configuration and its settings file
#[derive(Debug)]
pub struct ConfigManager {
    config_path: PathBuf,
    state: RwLock<Option<UserConfig>>,
}

impl ConfigManager {
    /// Create an unloaded manager for the given settings file
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            state: RwLock::new(None),
        }
    }

    /// Create a manager for the settings file under `paths` and load it
    pub fn open(paths: &OrbitPaths) -> OrbitResult<Self> {
        let manager = Self::new(paths.settings_file());
        manager.load()?;
        Ok(manager)
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Load the settings file, creating and persisting defaults on first run
    ///
    /// A file that parses but breaks an invariant still loads, so that
    /// `repair` can fix it; the problems are logged.
    pub fn load(&self) -> OrbitResult<()> {
        let mut state = self.state.write();

        if !self.config_path.exists() {
            let config = UserConfig::default();
            write_json_atomic(&self.config_path, &config)?;
            info!(path = %self.config_path.display(), "Created default configuration");
            *state = Some(config);
            return Ok(());
        }

        let config: UserConfig = read_json_required(&self.config_path).map_err(|e| {
            OrbitError::Config(format!(
                "Failed to load {}: {}",
                self.config_path.display(),
                e
            ))
        })?;

        if let Err(e) = config.validate() {
            warn!(path = %self.config_path.display(), "Loaded configuration needs repair: {}", e);
        }

        info!(path = %self.config_path.display(), "Configuration loaded");
        *state = Some(config);
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.state.read().is_some()
    }

    /// Independent copy of the current configuration
    pub fn get(&self) -> OrbitResult<UserConfig> {
        self.state.read().clone().ok_or_else(not_loaded)
    }

    /// Apply `mutator` to a copy and commit it only if it validates and persists
    ///
    /// On any failure the previous configuration stays live and on disk.
    pub fn update<F, T>(&self, mutator: F) -> OrbitResult<T>
    where
        F: FnOnce(&mut UserConfig) -> T,
    {
        self.try_update(|config| Ok(mutator(config)))
    }

    /// Like [`update`](Self::update), for mutators that can reject their input
    pub fn try_update<F, T>(&self, mutator: F) -> OrbitResult<T>
    where
        F: FnOnce(&mut UserConfig) -> OrbitResult<T>,
    {
        let mut state = self.state.write();
        let mut next = state.as_ref().ok_or_else(not_loaded)?.clone();

        let output = mutator(&mut next)?;
        next.validate()?;

        next.last_update = now_stamp();
        write_json_atomic(&self.config_path, &next)?;

        *state = Some(next);
        Ok(output)
    }

    /// Update only the bookkeeping section
    pub fn update_system<F>(&self, mutator: F) -> OrbitResult<()>
    where
        F: FnOnce(&mut SystemConfig),
    {
        self.update(|config| mutator(&mut config.system))
    }

    /// Bump the backup counter and timestamp
    pub fn record_backup(&self) -> OrbitResult<()> {
        self.update_system(|system| {
            system.backup_count += 1;
            system.last_backup_time = now_stamp();
        })
    }

    /// Bump the restore counter and timestamp
    pub fn record_restore(&self) -> OrbitResult<()> {
        self.update_system(|system| {
            system.restore_count += 1;
            system.last_restore_time = now_stamp();
        })
    }

    /// Set a single key from its textual value
    pub fn set(&self, key: ConfigKey, value: &str) -> OrbitResult<()> {
        self.try_update(|config| key.apply(config, value))
    }

    /// Repair common problems; returns what was changed
    pub fn repair(&self, key_search_dirs: &[PathBuf], user: &str) -> OrbitResult<Vec<String>> {
        let repairs = self.update(|config| repair(config, key_search_dirs, user))?;
        for change in &repairs {
            info!("Repaired: {}", change);
        }
        Ok(repairs)
    }
}

fn not_loaded() -> OrbitError {
    OrbitError::Config("Configuration has not been loaded".into())
}
