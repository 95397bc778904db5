//! Normalized relative paths
//!
//! Every archive entry name and every walked file is turned into a
//! `RelativePath` before it is joined onto a filesystem root. Construction
//! rejects anything that could leave the root: `..`, `.`, absolute paths,
//! drive prefixes and separators hidden inside a segment.

use std::ffi::OsStr;
use std::fmt;
use std::path::{Component, Path, PathBuf};

use crate::error::{OrbitError, OrbitResult};

/// A sequence of validated path segments, never escaping its root
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelativePath {
    segments: Vec<String>,
}

impl RelativePath {
    /// The empty path (the root itself)
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a `/`-separated archive entry name
    ///
    /// A single trailing `/` (directory marker) is accepted and dropped.
    pub fn parse(name: &str) -> OrbitResult<Self> {
        let trimmed = name.strip_suffix('/').unwrap_or(name);
        if trimmed.is_empty() {
            return Err(OrbitError::Format(format!("Empty entry name: {:?}", name)));
        }
        if trimmed.starts_with('/') {
            return Err(OrbitError::Format(format!("Absolute entry name: {}", name)));
        }

        let mut path = Self::root();
        for segment in trimmed.split('/') {
            path.push(segment)
                .map_err(|reason| OrbitError::Format(format!("Invalid entry name {}: {}", name, reason)))?;
        }
        Ok(path)
    }

    /// Build from a filesystem path that is already relative to some root
    pub fn from_path(path: &Path) -> OrbitResult<Self> {
        let mut out = Self::root();
        for component in path.components() {
            match component {
                Component::Normal(part) => {
                    let part = part.to_str().ok_or_else(|| {
                        OrbitError::Format(format!("Non UTF-8 path: {}", path.display()))
                    })?;
                    out.push(part).map_err(|reason| {
                        OrbitError::Format(format!("Invalid path {}: {}", path.display(), reason))
                    })?;
                }
                Component::CurDir => {}
                _ => {
                    return Err(OrbitError::Format(format!(
                        "Path is not relative: {}",
                        path.display()
                    )))
                }
            }
        }
        Ok(out)
    }

    /// Append one segment after validating it
    pub fn push(&mut self, segment: &str) -> Result<(), String> {
        validate_segment(segment)?;
        self.segments.push(segment.to_string());
        Ok(())
    }

    /// Return a new path with `other` appended
    pub fn join(&self, other: &RelativePath) -> RelativePath {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        RelativePath { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Whether `prefix` matches this path on whole-segment boundaries
    pub fn starts_with(&self, prefix: &RelativePath) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    /// Remainder after `prefix`, if this path lies under it
    pub fn strip_prefix(&self, prefix: &RelativePath) -> Option<RelativePath> {
        if !self.starts_with(prefix) {
            return None;
        }
        Some(RelativePath {
            segments: self.segments[prefix.len()..].to_vec(),
        })
    }

    /// Entry name for a file
    pub fn to_archive_name(&self) -> String {
        self.segments.join("/")
    }

    /// Entry name for a directory marker
    pub fn to_dir_name(&self) -> String {
        format!("{}/", self.to_archive_name())
    }

    /// Join onto a filesystem root one segment at a time
    pub fn resolve_under(&self, root: &Path) -> PathBuf {
        let mut path = root.to_path_buf();
        for segment in &self.segments {
            path.push(segment);
        }
        path
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_archive_name())
    }
}

/// A segment must name exactly one plain entry on the host platform
///
/// `:` and `\\` are ordinary file name characters on Unix; on Windows they
/// introduce drives, streams and separators and are rejected.
fn validate_segment(segment: &str) -> Result<(), String> {
    match segment {
        "" => return Err("empty path segment".into()),
        "." | ".." => return Err(format!("relative segment {:?} is not allowed", segment)),
        s if s.contains(['/', '\0']) => {
            return Err(format!("separator inside segment {:?}", s))
        }
        s if cfg!(windows) && s.contains(':') => {
            return Err(format!("drive or stream marker in segment {:?}", s))
        }
        _ => {}
    }

    let mut components = Path::new(segment).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(part)), None) if part == OsStr::new(segment) => Ok(()),
        _ => Err(format!("segment {:?} is not a single file name", segment)),
    }
}
