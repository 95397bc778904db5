//! Container reader and extractor
//!
//! Extraction happens in two phases. The first parses every entry name,
//! resolves it against the declared groups and decompresses the data; any
//! malformed name or unreadable entry rejects the whole container. Only then
//! does the second phase write to the filesystem.

use std::io::{Cursor, Read};
use std::path::PathBuf;

use tracing::{debug, info, warn};
use zip::result::ZipError;
use zip::ZipArchive;

use super::inventory::{SoftwareList, INVENTORY_FILE};
use super::manifest::{Manifest, MANIFEST_FILE};
use crate::error::{OrbitError, OrbitResult};
use crate::mapping::{DirectoryMapper, GroupMapping, RelativePath, CONFIGS_DIR};
use crate::storage::write_bytes_atomic;

/// One entry as stored in the container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub is_dir: bool,
    pub size: u64,
    pub compressed_size: u64,
}

/// Overview of a container without restoring it
#[derive(Debug, Clone, Default)]
pub struct ArchiveSummary {
    pub entries: Vec<ArchiveEntry>,
    /// Sum of uncompressed file sizes
    pub total_size: u64,
    pub has_manifest: bool,
    pub has_inventory: bool,
    /// Regular files under `configs/`
    pub config_files: usize,
    pub manifest: Option<Manifest>,
    /// `totalCount` of the embedded inventory, when it parses
    pub inventory_count: Option<usize>,
}

/// Outcome of an extraction
#[derive(Debug, Clone, Default)]
pub struct RestoreResult {
    pub files_restored: usize,
    pub directories_created: usize,
    pub bytes_written: u64,
    /// Groups that received at least one entry
    pub groups: Vec<String>,
    /// Entries that matched no declared group and were not written
    pub skipped: Vec<String>,
    pub manifest: Option<Manifest>,
}

impl RestoreResult {
    /// Get a summary of what was restored
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "Restored {} files and {} directories",
            self.files_restored, self.directories_created
        );
        if !self.groups.is_empty() {
            summary.push_str(&format!(" for {}", self.groups.join(", ")));
        }
        if !self.skipped.is_empty() {
            summary.push_str(&format!("; skipped {} unmatched entries", self.skipped.len()));
        }
        summary
    }
}

struct PlannedWrite {
    destination: PathBuf,
    data: Option<Vec<u8>>,
}

/// Read access to a plain container held in memory
pub struct ArchiveReader<'a> {
    archive: ZipArchive<Cursor<&'a [u8]>>,
}

impl<'a> ArchiveReader<'a> {
    pub fn new(bytes: &'a [u8]) -> OrbitResult<Self> {
        let archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| OrbitError::Format(format!("Not a valid backup container: {}", e)))?;
        Ok(Self { archive })
    }

    pub fn len(&self) -> usize {
        self.archive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archive.len() == 0
    }

    /// Entries in stored order
    pub fn entries(&mut self) -> OrbitResult<Vec<ArchiveEntry>> {
        let mut entries = Vec::with_capacity(self.archive.len());
        for index in 0..self.archive.len() {
            let file = self.archive.by_index(index).map_err(format_error)?;
            entries.push(ArchiveEntry {
                name: file.name().to_string(),
                is_dir: file.is_dir(),
                size: file.size(),
                compressed_size: file.compressed_size(),
            });
        }
        Ok(entries)
    }

    /// Contents of a named entry, or `None` when the container lacks it
    pub fn read_entry(&mut self, name: &str) -> OrbitResult<Option<Vec<u8>>> {
        let mut file = match self.archive.by_name(name) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(format_error(e)),
        };

        let mut data = Vec::new();
        file.read_to_end(&mut data)
            .map_err(|e| OrbitError::Format(format!("Failed to read entry {}: {}", name, e)))?;
        Ok(Some(data))
    }

    pub fn manifest(&mut self) -> OrbitResult<Option<Manifest>> {
        self.read_entry(MANIFEST_FILE)?
            .map(|bytes| Manifest::from_json(&bytes))
            .transpose()
    }

    /// Summarize the container
    pub fn summarize(&mut self) -> OrbitResult<ArchiveSummary> {
        let entries = self.entries()?;

        let mut summary = ArchiveSummary::default();
        for entry in &entries {
            if !entry.is_dir {
                summary.total_size += entry.size;
            }
            if entry.name == MANIFEST_FILE {
                summary.has_manifest = true;
            } else if entry.name == INVENTORY_FILE {
                summary.has_inventory = true;
            } else if entry.name.starts_with("configs/") && !entry.is_dir {
                summary.config_files += 1;
            }
        }
        summary.entries = entries;

        if summary.has_manifest {
            summary.manifest = self.manifest()?;
        }
        if summary.has_inventory {
            summary.inventory_count = self
                .read_entry(INVENTORY_FILE)?
                .and_then(|bytes| SoftwareList::from_json(&bytes).ok())
                .map(|list| list.total_count);
        }
        Ok(summary)
    }

    /// Restore every entry of the declared groups to its original location
    pub fn extract(&mut self, mapper: &DirectoryMapper) -> OrbitResult<RestoreResult> {
        let mut result = RestoreResult::default();
        let mut plan = Vec::new();

        for index in 0..self.archive.len() {
            let mut file = self.archive.by_index(index).map_err(format_error)?;
            let name = file.name().to_string();
            let relative = RelativePath::parse(&name)?;

            if name == MANIFEST_FILE || name == INVENTORY_FILE {
                continue;
            }
            if relative.segments().first().map(String::as_str) != Some(CONFIGS_DIR) {
                warn!(entry = %name, "Ignoring entry outside the configs directory");
                result.skipped.push(name);
                continue;
            }
            if relative.len() == 1 {
                continue;
            }

            let resolved = match mapper.reverse(&relative) {
                Ok(resolved) => resolved,
                Err(e) => {
                    warn!(entry = %name, "Dropping entry: {}", e);
                    result.skipped.push(name);
                    continue;
                }
            };

            let data = if file.is_dir() {
                None
            } else {
                let mut data = Vec::new();
                file.read_to_end(&mut data).map_err(|e| {
                    OrbitError::Format(format!("Failed to read entry {}: {}", name, e))
                })?;
                Some(data)
            };

            if !result.groups.contains(&resolved.group) {
                result.groups.push(resolved.group.clone());
            }
            plan.push(PlannedWrite {
                destination: resolved.destination,
                data,
            });
        }

        result.manifest = self.manifest()?;

        for write in plan {
            match write.data {
                None => {
                    std::fs::create_dir_all(&write.destination).map_err(|e| {
                        OrbitError::Io(format!(
                            "Failed to create {}: {}",
                            write.destination.display(),
                            e
                        ))
                    })?;
                    result.directories_created += 1;
                }
                Some(data) => {
                    debug!(path = %write.destination.display(), "Restoring file");
                    write_bytes_atomic(&write.destination, &data)?;
                    result.files_restored += 1;
                    result.bytes_written += data.len() as u64;
                }
            }
        }

        info!(
            files = result.files_restored,
            directories = result.directories_created,
            skipped = result.skipped.len(),
            "Extraction complete"
        );
        Ok(result)
    }
}

fn format_error(e: ZipError) -> OrbitError {
    OrbitError::Format(format!("Corrupt backup container: {}", e))
}

/// Restore a plain container for the given groups
pub fn extract_archive(bytes: &[u8], mappings: &[GroupMapping]) -> OrbitResult<RestoreResult> {
    let mapper = DirectoryMapper::for_restore(mappings)?;
    ArchiveReader::new(bytes)?.extract(&mapper)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::build_archive;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::FileOptions;
    use zip::ZipWriter;

    fn manifest() -> Manifest {
        Manifest {
            timestamp: "2024-01-01T00:00:00+00:00".into(),
            os: "linux".into(),
            arch: "x86_64".into(),
            hostname: "box".into(),
            username: "me".into(),
        }
    }

    fn raw_container(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in entries {
            if name.ends_with('/') {
                writer.add_directory(*name, FileOptions::default()).unwrap();
            } else {
                writer.start_file(*name, FileOptions::default()).unwrap();
                writer.write_all(data).unwrap();
            }
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_two_group_round_trip() {
        let source = TempDir::new().unwrap();
        let a_root = source.path().join("a").join("Code");
        let b_root = source.path().join("b").join(".vscode");
        std::fs::create_dir_all(&a_root).unwrap();
        std::fs::create_dir_all(b_root.join("snippets")).unwrap();
        std::fs::create_dir_all(b_root.join("empty")).unwrap();
        std::fs::write(a_root.join("settings.json"), "X").unwrap();
        std::fs::write(b_root.join("snippets").join("a.json"), "Y").unwrap();

        let mut mapper = DirectoryMapper::new();
        mapper.register(GroupMapping::in_place("A", &a_root)).unwrap();
        mapper.register(GroupMapping::in_place("B", &b_root)).unwrap();
        let archive = build_archive(&mapper, &manifest(), None).unwrap();

        let target = TempDir::new().unwrap();
        let a_dest = target.path().join("restored-a");
        let b_dest = target.path().join("restored-b");
        let mappings = vec![
            GroupMapping::new("A", &a_root, &a_dest),
            GroupMapping::new("B", &b_root, &b_dest),
        ];

        let result = extract_archive(&archive.bytes, &mappings).unwrap();

        assert_eq!(std::fs::read_to_string(a_dest.join("settings.json")).unwrap(), "X");
        assert_eq!(
            std::fs::read_to_string(b_dest.join("snippets").join("a.json")).unwrap(),
            "Y"
        );
        assert!(b_dest.join("empty").is_dir());
        assert_eq!(result.files_restored, 2);
        assert_eq!(result.groups, vec!["A".to_string(), "B".to_string()]);
        assert!(result.skipped.is_empty());
        assert_eq!(result.manifest, Some(manifest()));
    }

    #[cfg(unix)]
    #[test]
    fn test_colon_and_backslash_names_round_trip() {
        let source = TempDir::new().unwrap();
        let root = source.path().join("Code");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join("note:1.json"), "colon").unwrap();
        std::fs::write(root.join("back\\slash.json"), "backslash").unwrap();

        let mut mapper = DirectoryMapper::new();
        mapper.register(GroupMapping::in_place("A", &root)).unwrap();
        let archive = build_archive(&mapper, &manifest(), None).unwrap();
        assert_eq!(archive.stats.files, 2);

        let target = TempDir::new().unwrap();
        let dest = target.path().join("Code");
        let result =
            extract_archive(&archive.bytes, &[GroupMapping::new("A", &root, &dest)]).unwrap();

        assert_eq!(result.files_restored, 2);
        assert_eq!(std::fs::read_to_string(dest.join("note:1.json")).unwrap(), "colon");
        assert_eq!(
            std::fs::read_to_string(dest.join("back\\slash.json")).unwrap(),
            "backslash"
        );
    }

    #[test]
    fn test_undeclared_groups_are_dropped() {
        let target = TempDir::new().unwrap();
        let dest = target.path().join("Code");
        let bytes = raw_container(&[
            ("configs/A/Code/settings.json", b"ok"),
            ("configs/EVIL/Code/payload", b"no"),
            ("stray.txt", b"no"),
        ]);

        let result = extract_archive(&bytes, &[GroupMapping::new("A", "/src/Code", &dest)]).unwrap();

        assert_eq!(std::fs::read_to_string(dest.join("settings.json")).unwrap(), "ok");
        assert_eq!(result.files_restored, 1);
        assert_eq!(result.skipped.len(), 2);
        assert!(!target.path().join("EVIL").exists());
    }

    #[test]
    fn test_traversal_rejects_whole_container() {
        let target = TempDir::new().unwrap();
        let dest = target.path().join("Code");
        let bytes = raw_container(&[
            ("configs/A/Code/settings.json", b"ok"),
            ("configs/A/Code/../../../escape", b"no"),
        ]);

        let err = extract_archive(&bytes, &[GroupMapping::new("A", "/src/Code", &dest)]).unwrap_err();

        assert!(err.is_format());
        assert!(!dest.exists());
    }

    #[test]
    fn test_absolute_entry_rejected() {
        let bytes = raw_container(&[("/etc/passwd", b"no")]);
        let err = extract_archive(&bytes, &[GroupMapping::in_place("A", "/src/Code")]).unwrap_err();
        assert!(err.is_format());
    }

    #[test]
    fn test_garbage_is_format_error() {
        assert!(ArchiveReader::new(b"definitely not a zip").err().unwrap().is_format());
    }

    #[test]
    fn test_summary_counts() {
        let inventory = br#"{"timestamp":"t","totalCount":3,"software":[]}"#;
        let bytes = raw_container(&[
            ("manifest.json", &manifest().to_json().unwrap()),
            ("software-list.json", inventory),
            ("configs/A/Code/", b""),
            ("configs/A/Code/settings.json", b"12345"),
            ("configs/A/Code/keybindings.json", b"123"),
        ]);

        let summary = ArchiveReader::new(&bytes).unwrap().summarize().unwrap();

        assert_eq!(summary.entries.len(), 5);
        assert_eq!(summary.config_files, 2);
        assert!(summary.has_manifest);
        assert!(summary.has_inventory);
        assert_eq!(summary.inventory_count, Some(3));
        assert_eq!(summary.manifest.unwrap().hostname, "box");
        assert_eq!(
            summary.total_size,
            5 + 3 + inventory.len() as u64 + manifest().to_json().unwrap().len() as u64
        );
    }

    #[test]
    fn test_restore_result_summary() {
        let result = RestoreResult {
            files_restored: 3,
            directories_created: 1,
            groups: vec!["A".into()],
            skipped: vec!["configs/X/y".into()],
            ..Default::default()
        };
        assert_eq!(
            result.summary(),
            "Restored 3 files and 1 directories for A; skipped 1 unmatched entries"
        );
    }
}
