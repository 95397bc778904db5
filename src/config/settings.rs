//! User configuration for Orbit
//!
//! Holds the backup counters, the configuration directory groups, software
//! inventory filters and the encryption policy. Persisted as indented JSON.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::error::{OrbitError, OrbitResult};
use crate::mapping::{validate_group_name, GroupMapping};

/// Timestamp format used for the persisted bookkeeping fields
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Descriptive only; the envelope always uses RSA-OAEP + AES-256-GCM
pub const DEFAULT_ALGORITHM: &str = "RSA-2048";

/// Backup and restore bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SystemConfig {
    pub last_backup_time: String,
    pub backup_count: u64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub last_restore_time: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub restore_count: u64,
    /// Directory `save` writes to when no output path is given
    pub default_backup_path: PathBuf,
}

fn is_zero(n: &u64) -> bool {
    *n == 0
}

/// Editor configuration directories to back up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct VSCodeConfig {
    pub config_dirs: Vec<GroupMapping>,
    pub excluded_extensions: Vec<String>,
    /// Whether the configuration directories are included in backups
    pub backup_setting: bool,
}

/// Filters handed to the software inventory collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SoftwareConfig {
    pub excluded_patterns: Vec<String>,
    pub include_store_apps: bool,
    pub auto_update_list: bool,
}

/// Encryption policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EncryptionConfig {
    pub enabled: bool,
    pub public_key_path: String,
    pub private_key_path: String,
    pub default_algorithm: String,
}

/// Complete persisted configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default)]
    pub system: SystemConfig,
    #[serde(default)]
    pub vscode: VSCodeConfig,
    #[serde(default)]
    pub software: SoftwareConfig,
    #[serde(default)]
    pub encryption: EncryptionConfig,
    #[serde(default)]
    pub last_update: String,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            system: SystemConfig {
                default_backup_path: current_dir(),
                ..SystemConfig::default()
            },
            vscode: VSCodeConfig {
                config_dirs: default_config_dirs(),
                excluded_extensions: Vec::new(),
                backup_setting: true,
            },
            software: SoftwareConfig {
                excluded_patterns: vec![
                    "Mozilla Firefox".into(),
                    "Visual Studio Code".into(),
                    "Google Chrome".into(),
                ],
                include_store_apps: false,
                auto_update_list: true,
            },
            // Enabled with placeholder paths until keys are generated
            encryption: EncryptionConfig {
                enabled: true,
                public_key_path: String::new(),
                private_key_path: String::new(),
                default_algorithm: DEFAULT_ALGORITHM.into(),
            },
            last_update: now_stamp(),
        }
    }
}

/// The two default groups: the editor's roaming config dir and its home dir
pub fn default_config_dirs() -> Vec<GroupMapping> {
    let (config_dir, home_dir) = match BaseDirs::new() {
        Some(dirs) => (dirs.config_dir().to_path_buf(), dirs.home_dir().to_path_buf()),
        None => (PathBuf::new(), PathBuf::new()),
    };

    vec![
        GroupMapping::in_place("APPDATA", config_dir.join("Code")),
        GroupMapping::in_place("USER", home_dir.join(".vscode")),
    ]
}

/// Local time in the persisted timestamp format
pub fn now_stamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

fn current_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

impl UserConfig {
    /// Strict invariants; every update must pass these
    pub fn validate(&self) -> OrbitResult<()> {
        if self.system.default_backup_path.as_os_str().is_empty() {
            return Err(OrbitError::Validation(
                "Default backup path cannot be empty".into(),
            ));
        }

        if self.vscode.config_dirs.is_empty() {
            return Err(OrbitError::Validation(
                "At least one configuration directory group is required".into(),
            ));
        }

        let mut seen = HashSet::new();
        for dir in &self.vscode.config_dirs {
            validate_group_name(&dir.name)?;
            let root = dir.archive_root()?;
            if !seen.insert(root.clone()) {
                return Err(OrbitError::Validation(format!(
                    "Directory {} in group {} maps to archive root {}, which is already used",
                    dir.path.display(),
                    dir.name,
                    root
                )));
            }
        }

        if self.encryption.enabled {
            if self.encryption.public_key_path.trim().is_empty() {
                return Err(OrbitError::Validation(
                    "Public key path cannot be empty while encryption is enabled".into(),
                ));
            }
            if self.encryption.private_key_path.trim().is_empty() {
                return Err(OrbitError::Validation(
                    "Private key path cannot be empty while encryption is enabled".into(),
                ));
            }
        }

        Ok(())
    }

    /// Human-readable list of problems, including missing files on disk
    ///
    /// Unlike `validate`, this never fails; an empty list means healthy.
    pub fn validation_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        let backup_path = &self.system.default_backup_path;
        if backup_path.as_os_str().is_empty() {
            issues.push("Default backup path is empty".to_string());
        } else if !backup_path.exists() {
            issues.push(format!(
                "Default backup path does not exist: {}",
                backup_path.display()
            ));
        }

        if self.vscode.config_dirs.is_empty() {
            issues.push("No configuration directory groups are defined".to_string());
        }
        let mut seen = HashSet::new();
        for dir in &self.vscode.config_dirs {
            match dir.archive_root() {
                Ok(root) if !seen.insert(root.clone()) => issues.push(format!(
                    "Directory {} in group {} maps to archive root {}, which is already used",
                    dir.path.display(),
                    dir.name,
                    root
                )),
                Ok(_) => {}
                Err(e) => issues.push(e.to_string()),
            }
            if !dir.path.exists() {
                issues.push(format!(
                    "Configuration directory for {} does not exist: {}",
                    dir.name,
                    dir.path.display()
                ));
            }
        }

        if self.encryption.enabled {
            check_key_path(&mut issues, "Public", &self.encryption.public_key_path);
            check_key_path(&mut issues, "Private", &self.encryption.private_key_path);
        }

        issues
    }
}

fn check_key_path(issues: &mut Vec<String>, kind: &str, path: &str) {
    if path.trim().is_empty() {
        issues.push(format!("Encryption is enabled but the {} key path is empty", kind.to_lowercase()));
    } else if !Path::new(path).exists() {
        issues.push(format!("{} key file does not exist: {}", kind, path));
    }
}

/// Fix common problems in place; returns a description per repair
///
/// `key_search_dirs` are probed for a public key when the configured one is
/// missing. `user` is the name used for `<user>_public_key.pem`.
pub fn repair(config: &mut UserConfig, key_search_dirs: &[PathBuf], user: &str) -> Vec<String> {
    let mut repairs = Vec::new();

    if config.system.default_backup_path.as_os_str().is_empty() {
        config.system.default_backup_path = current_dir();
        repairs.push("Default backup path set to the current directory".to_string());
    }

    if config.vscode.config_dirs.is_empty() {
        config.vscode.config_dirs = default_config_dirs();
        repairs.push("Configuration directory groups reset to defaults".to_string());
    }

    let enc = &mut config.encryption;
    if enc.enabled
        && (enc.public_key_path.trim().is_empty() || enc.private_key_path.trim().is_empty())
    {
        enc.enabled = false;
        repairs.push("Encryption disabled because a key path is missing".to_string());
    }

    if enc.enabled && !Path::new(&enc.public_key_path).exists() {
        let candidates = key_search_dirs.iter().flat_map(|dir| {
            [
                dir.join("public.pem"),
                dir.join(format!("{}_public_key.pem", user)),
            ]
        });
        for candidate in candidates {
            if candidate.is_file() {
                enc.public_key_path = candidate.display().to_string();
                repairs.push(format!("Public key found at {}", candidate.display()));
                break;
            }
        }
    }

    repairs
}

/// Keys accepted by `config set`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    BackupPath,
    EncryptionEnabled,
    PublicKeyPath,
    PrivateKeyPath,
    IncludeStoreApps,
    AutoUpdateList,
    BackupSetting,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 7] = [
        ConfigKey::BackupPath,
        ConfigKey::EncryptionEnabled,
        ConfigKey::PublicKeyPath,
        ConfigKey::PrivateKeyPath,
        ConfigKey::IncludeStoreApps,
        ConfigKey::AutoUpdateList,
        ConfigKey::BackupSetting,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKey::BackupPath => "backup-path",
            ConfigKey::EncryptionEnabled => "encryption-enabled",
            ConfigKey::PublicKeyPath => "public-key-path",
            ConfigKey::PrivateKeyPath => "private-key-path",
            ConfigKey::IncludeStoreApps => "include-store-apps",
            ConfigKey::AutoUpdateList => "auto-update-list",
            ConfigKey::BackupSetting => "backup-setting",
        }
    }

    /// Write `value` into the matching field
    ///
    /// Boolean keys reject anything but `true|1|yes|false|0|no`; the config
    /// is left untouched in that case.
    pub fn apply(&self, config: &mut UserConfig, value: &str) -> OrbitResult<()> {
        match self {
            ConfigKey::BackupPath => config.system.default_backup_path = PathBuf::from(value),
            ConfigKey::EncryptionEnabled => config.encryption.enabled = parse_flag(*self, value)?,
            ConfigKey::PublicKeyPath => config.encryption.public_key_path = value.to_string(),
            ConfigKey::PrivateKeyPath => config.encryption.private_key_path = value.to_string(),
            ConfigKey::IncludeStoreApps => {
                config.software.include_store_apps = parse_flag(*self, value)?
            }
            ConfigKey::AutoUpdateList => config.software.auto_update_list = parse_flag(*self, value)?,
            ConfigKey::BackupSetting => config.vscode.backup_setting = parse_flag(*self, value)?,
        }
        Ok(())
    }
}

impl FromStr for ConfigKey {
    type Err = OrbitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == lowered)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|k| k.as_str()).collect();
                OrbitError::Config(format!(
                    "Unknown configuration key '{}' (expected one of: {})",
                    s,
                    known.join(", ")
                ))
            })
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn parse_flag(key: ConfigKey, value: &str) -> OrbitResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(OrbitError::Config(format!(
            "Invalid value '{}' for {} (expected true/false, 1/0 or yes/no)",
            value, key
        ))),
    }
}
