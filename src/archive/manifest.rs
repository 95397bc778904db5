//! Per-backup manifest
//!
//! Written once at the root of every container as `manifest.json` and never
//! modified afterwards.

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::error::OrbitResult;

/// Root entry name of the manifest
pub const MANIFEST_FILE: &str = "manifest.json";

/// When, where and by whom a backup was produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// RFC 3339 creation time
    pub timestamp: String,
    pub os: String,
    pub arch: String,
    pub hostname: String,
    pub username: String,
}

impl Manifest {
    /// Describe the current machine and user at this instant
    pub fn capture() -> Self {
        Self {
            timestamp: Local::now().to_rfc3339(),
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            hostname: hostname(),
            username: current_username().unwrap_or_else(|| "unknown".to_string()),
        }
    }

    pub fn to_json(&self) -> OrbitResult<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    pub fn from_json(bytes: &[u8]) -> OrbitResult<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Login name of the current user, if the environment exposes one
pub fn current_username() -> Option<String> {
    ["USER", "USERNAME"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|name| !name.trim().is_empty())
}

/// Host name from the operating system, then the environment
fn hostname() -> String {
    let name = gethostname::gethostname().to_string_lossy().trim().to_string();
    if !name.is_empty() {
        return name;
    }
    ["HOSTNAME", "COMPUTERNAME"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|name| !name.trim().is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_fills_every_field() {
        let manifest = Manifest::capture();
        assert!(chrono::DateTime::parse_from_rfc3339(&manifest.timestamp).is_ok());
        assert_eq!(manifest.os, std::env::consts::OS);
        assert_eq!(manifest.arch, std::env::consts::ARCH);
        assert!(!manifest.hostname.is_empty());
        assert!(!manifest.username.is_empty());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_hostname_comes_from_the_kernel() {
        let kernel = std::fs::read_to_string("/proc/sys/kernel/hostname").unwrap();
        assert_eq!(Manifest::capture().hostname, kernel.trim());
    }

    #[test]
    fn test_json_field_names() {
        let manifest = Manifest {
            timestamp: "2024-01-01T00:00:00+00:00".into(),
            os: "linux".into(),
            arch: "x86_64".into(),
            hostname: "box".into(),
            username: "me".into(),
        };
        let json: serde_json::Value = serde_json::from_slice(&manifest.to_json().unwrap()).unwrap();
        for key in ["timestamp", "os", "arch", "hostname", "username"] {
            assert!(json.get(key).is_some(), "missing {}", key);
        }
        assert_eq!(Manifest::from_json(&manifest.to_json().unwrap()).unwrap(), manifest);
    }
}
