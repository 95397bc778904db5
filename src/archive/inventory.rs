//! Installed-software inventory
//!
//! The inventory is produced elsewhere and embedded verbatim as
//! `software-list.json`. It is parsed only to check it is well formed and to
//! report its size.

use serde::{Deserialize, Serialize};

use crate::error::{OrbitError, OrbitResult};

/// Root entry name of the software inventory
pub const INVENTORY_FILE: &str = "software-list.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Software {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub publisher: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub install_date: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub install_path: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uninstall: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoftwareList {
    pub timestamp: String,
    pub total_count: usize,
    #[serde(default)]
    pub software: Vec<Software>,
}

impl SoftwareList {
    /// Parse an inventory document
    pub fn from_json(bytes: &[u8]) -> OrbitResult<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| OrbitError::Format(format!("Invalid software inventory: {}", e)))
    }
}
