//! Path management for Orbit
//!
//! Provides per-user path resolution for the settings file and key storage.
//!
//! ## Path Resolution Order
//!
//! 1. `ORBIT_CONFIG_DIR` environment variable (if set)
//! 2. Windows: `%APPDATA%\orbit_user`
//! 3. Unix (Linux/macOS): the platform config dir (`$XDG_CONFIG_HOME` or
//!    `~/.config` on Linux, `~/Library/Application Support` on macOS) + `orbit_user`

use std::path::{Path, PathBuf};

use directories::BaseDirs;

use crate::error::OrbitError;

/// Name of the per-user directory holding Orbit state
pub const APP_DIR_NAME: &str = "orbit_user";

/// Manages all paths used by Orbit
#[derive(Debug, Clone)]
pub struct OrbitPaths {
    /// Base directory for all Orbit state
    base_dir: PathBuf,
}

impl OrbitPaths {
    /// Create a new OrbitPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, OrbitError> {
        let base_dir = if let Ok(custom) = std::env::var("ORBIT_CONFIG_DIR") {
            PathBuf::from(custom)
        } else {
            let dirs = BaseDirs::new().ok_or_else(|| {
                OrbitError::Config("Could not determine the user's config directory".into())
            })?;
            dirs.config_dir().join(APP_DIR_NAME)
        };

        Ok(Self { base_dir })
    }

    /// Create OrbitPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("info.json")
    }

    /// Get the directory generated key pairs are written to
    pub fn keys_dir(&self) -> PathBuf {
        self.base_dir.join("keys")
    }

    /// Ensure the base and keys directories exist
    pub fn ensure_directories(&self) -> Result<(), OrbitError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| OrbitError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.keys_dir())
            .map_err(|e| OrbitError::Io(format!("Failed to create keys directory: {}", e)))?;

        Ok(())
    }

    /// Check if Orbit has been initialized (settings file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_custom_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = OrbitPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.base_dir(), temp_dir.path());
        assert_eq!(paths.settings_file(), temp_dir.path().join("info.json"));
        assert_eq!(paths.keys_dir(), temp_dir.path().join("keys"));
    }

    #[test]
    fn test_env_var_override() {
        let temp_dir = TempDir::new().unwrap();
        let custom_path = temp_dir.path().to_str().unwrap();

        env::set_var("ORBIT_CONFIG_DIR", custom_path);

        let paths = OrbitPaths::new().unwrap();
        assert_eq!(paths.base_dir(), temp_dir.path());

        env::remove_var("ORBIT_CONFIG_DIR");
    }

    #[test]
    fn test_ensure_directories() {
        let temp_dir = TempDir::new().unwrap();
        let paths = OrbitPaths::with_base_dir(temp_dir.path().join("orbit_user"));

        assert!(!paths.is_initialized());
        paths.ensure_directories().unwrap();

        assert!(paths.base_dir().exists());
        assert!(paths.keys_dir().exists());
    }
}
