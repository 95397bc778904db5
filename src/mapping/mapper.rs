//! Directory mapper
//!
//! Translates between group mappings and archive roots in both directions.
//! Restore resolution is allow-list only: an entry that does not fall under
//! a declared archive root is never written anywhere.

use std::path::PathBuf;

use tracing::debug;

use super::{GroupMapping, RelativePath};
use crate::error::{OrbitError, OrbitResult};

/// A mapping together with its computed archive root
#[derive(Debug, Clone)]
pub struct MappedRoot {
    pub mapping: GroupMapping,
    pub archive_root: RelativePath,
}

/// Where an archive entry lands on restore
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEntry {
    /// Group the entry belongs to
    pub group: String,
    /// Path below the group's archive root
    pub relative: RelativePath,
    /// Filesystem destination
    pub destination: PathBuf,
}

/// Registry of group mappings
#[derive(Debug, Clone, Default)]
pub struct DirectoryMapper {
    roots: Vec<MappedRoot>,
}

impl DirectoryMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a mapper for restore from the declared groups
    ///
    /// Destinations do not have to exist yet.
    pub fn for_restore(mappings: &[GroupMapping]) -> OrbitResult<Self> {
        let mut mapper = Self::new();
        for mapping in mappings {
            mapper.declare(mapping.clone())?;
        }
        Ok(mapper)
    }

    /// Deterministic archive root for a mapping
    pub fn resolve(mapping: &GroupMapping) -> OrbitResult<RelativePath> {
        mapping.archive_root()
    }

    /// Record a group for backup
    ///
    /// Fails with `NotFound` when the source root is missing; callers treat
    /// that as a skip, not an abort.
    pub fn register(&mut self, mapping: GroupMapping) -> OrbitResult<&RelativePath> {
        if !mapping.path.is_dir() {
            return Err(OrbitError::source_root_not_found(&mapping.path));
        }
        self.declare(mapping)
    }

    /// Record a group without touching the filesystem
    pub fn declare(&mut self, mapping: GroupMapping) -> OrbitResult<&RelativePath> {
        let archive_root = Self::resolve(&mapping)?;

        if let Some(existing) = self.roots.iter().find(|r| r.archive_root == archive_root) {
            return Err(OrbitError::Validation(format!(
                "{} and {} both map to archive root {}",
                existing.mapping.path.display(),
                mapping.path.display(),
                archive_root
            )));
        }

        debug!(group = %mapping.name, root = %archive_root, "Declared group root");
        self.roots.push(MappedRoot {
            mapping,
            archive_root,
        });

        let last = self.roots.len() - 1;
        Ok(&self.roots[last].archive_root)
    }

    /// Registered roots in registration order
    pub fn roots(&self) -> &[MappedRoot] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Names of the declared groups, deduplicated, in registration order
    pub fn group_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for root in &self.roots {
            if !names.contains(&root.mapping.name.as_str()) {
                names.push(&root.mapping.name);
            }
        }
        names
    }

    /// Map an archive entry back to its destination
    ///
    /// Picks the longest declared archive root that prefixes the entry.
    pub fn reverse(&self, entry: &RelativePath) -> OrbitResult<ResolvedEntry> {
        let best = self
            .roots
            .iter()
            .filter(|r| entry.starts_with(&r.archive_root))
            .max_by_key(|r| r.archive_root.len())
            .ok_or_else(|| {
                OrbitError::Mapping(format!("Entry {} matches no declared group", entry))
            })?;

        let relative = entry
            .strip_prefix(&best.archive_root)
            .unwrap_or_default();

        Ok(ResolvedEntry {
            group: best.mapping.name.clone(),
            destination: relative.resolve_under(&best.mapping.original_path),
            relative,
        })
    }
}
