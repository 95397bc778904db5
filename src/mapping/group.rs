//! Group mapping records
//!
//! A group mapping ties a logical group name to the directory that is backed
//! up and the directory it is restored into.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{RelativePath, CONFIGS_DIR};
use crate::error::{OrbitError, OrbitResult};

/// A configuration directory belonging to a logical group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMapping {
    /// Logical group name, e.g. `APPDATA`
    pub name: String,
    /// Directory read during backup
    pub path: PathBuf,
    /// Directory the group's subtree is written back to on restore
    pub original_path: PathBuf,
}

impl GroupMapping {
    /// Create a mapping that restores to a different location than it backs up
    pub fn new(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        original_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            original_path: original_path.into(),
        }
    }

    /// Create a mapping that restores in place
    pub fn in_place(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self::new(name, path.clone(), path)
    }

    /// Archive root for this mapping: `configs/<group>/<base name of path>`
    pub fn archive_root(&self) -> OrbitResult<RelativePath> {
        validate_group_name(&self.name)?;

        let base = base_name(&self.path).ok_or_else(|| {
            OrbitError::Validation(format!(
                "Group {} has no usable directory name in {}",
                self.name,
                self.path.display()
            ))
        })?;

        let mut root = RelativePath::root();
        for segment in [CONFIGS_DIR, self.name.as_str(), base] {
            root.push(segment).map_err(|reason| {
                OrbitError::Validation(format!("Group {}: {}", self.name, reason))
            })?;
        }
        Ok(root)
    }
}

/// Group names become a single archive path segment
pub fn validate_group_name(name: &str) -> OrbitResult<()> {
    if name.trim().is_empty() {
        return Err(OrbitError::Validation("Group name cannot be empty".into()));
    }
    RelativePath::root()
        .push(name)
        .map_err(|reason| OrbitError::Validation(format!("Invalid group name {:?}: {}", name, reason)))
}

fn base_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_root_uses_base_name() {
        let mapping = GroupMapping::in_place("APPDATA", "/home/me/.config/Code");
        assert_eq!(
            mapping.archive_root().unwrap().to_archive_name(),
            "configs/APPDATA/Code"
        );
    }

    #[test]
    fn test_archive_root_rejects_bad_names() {
        assert!(GroupMapping::in_place("", "/x/Code").archive_root().is_err());
        assert!(GroupMapping::in_place("..", "/x/Code").archive_root().is_err());
        assert!(GroupMapping::in_place("a/b", "/x/Code").archive_root().is_err());
        assert!(GroupMapping::in_place("USER", "/").archive_root().is_err());
    }

    #[test]
    fn test_serde_shape() {
        let mapping = GroupMapping::new("USER", "/home/me/.vscode", "/restore/.vscode");
        let json = serde_json::to_value(&mapping).unwrap();
        assert_eq!(json["name"], "USER");
        assert_eq!(json["original_path"], "/restore/.vscode");
    }
}
