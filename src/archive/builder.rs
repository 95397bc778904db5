//! In-memory container builder
//!
//! Walks every mapped root into a ZIP container held in a `Vec<u8>`, so the
//! result can be encrypted before anything touches the disk. Any I/O error
//! during the walk aborts the build and the partial buffer is dropped.

use std::fs::File;
use std::io::{self, Cursor, Write};
use std::path::PathBuf;

use tracing::{debug, info, warn};
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::inventory::INVENTORY_FILE;
use super::manifest::{Manifest, MANIFEST_FILE};
use crate::error::{OrbitError, OrbitResult};
use crate::mapping::{DirectoryMapper, MappedRoot, RelativePath};

/// Counts gathered while building
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Regular files written under `configs/`
    pub files: usize,
    /// Directory markers written, source roots included
    pub directories: usize,
    /// Uncompressed bytes of group files
    pub bytes: u64,
    /// Symlinks that were not followed
    pub skipped_links: Vec<PathBuf>,
    /// Sockets, FIFOs and device nodes, which have no content to archive
    pub skipped_special: Vec<PathBuf>,
}

/// A finished container
#[derive(Debug)]
pub struct BuiltArchive {
    pub bytes: Vec<u8>,
    pub stats: BuildStats,
}

/// Incremental container writer
pub struct ArchiveBuilder {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    options: FileOptions,
    stats: BuildStats,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            options: FileOptions::default().compression_method(CompressionMethod::Deflated),
            stats: BuildStats::default(),
        }
    }

    pub fn add_manifest(&mut self, manifest: &Manifest) -> OrbitResult<()> {
        let json = manifest.to_json()?;
        self.add_root_file(MANIFEST_FILE, &json)
    }

    /// Embed the software inventory verbatim
    pub fn add_inventory(&mut self, inventory: &[u8]) -> OrbitResult<()> {
        self.add_root_file(INVENTORY_FILE, inventory)
    }

    /// Walk one mapped root into the container
    pub fn add_root(&mut self, root: &MappedRoot) -> OrbitResult<()> {
        let source = &root.mapping.path;
        info!(group = %root.mapping.name, source = %source.display(), "Archiving group root");

        let walker = WalkDir::new(source).follow_links(false).sort_by_file_name();
        for entry in walker {
            let entry = entry.map_err(|e| {
                OrbitError::Io(format!("Failed to walk {}: {}", source.display(), e))
            })?;

            let relative = entry.path().strip_prefix(source).map_err(|e| {
                OrbitError::Io(format!("Failed to relativize {}: {}", entry.path().display(), e))
            })?;
            let name = root.archive_root.join(&RelativePath::from_path(relative)?);
            let file_type = entry.file_type();

            if file_type.is_symlink() {
                warn!(path = %entry.path().display(), "Skipping symbolic link");
                self.stats.skipped_links.push(entry.path().to_path_buf());
            } else if file_type.is_dir() {
                self.add_directory(&name)?;
            } else if file_type.is_file() {
                self.add_file(&name, entry.path())?;
            } else {
                warn!(path = %entry.path().display(), "Skipping special file");
                self.stats.skipped_special.push(entry.path().to_path_buf());
            }
        }
        Ok(())
    }

    pub fn finish(mut self) -> OrbitResult<BuiltArchive> {
        let cursor = self
            .writer
            .finish()
            .map_err(|e| OrbitError::Io(format!("Failed to finalize archive: {}", e)))?;
        Ok(BuiltArchive {
            bytes: cursor.into_inner(),
            stats: self.stats,
        })
    }

    fn add_root_file(&mut self, name: &str, bytes: &[u8]) -> OrbitResult<()> {
        self.writer
            .start_file(name, self.options)
            .map_err(|e| OrbitError::Io(format!("Failed to add {}: {}", name, e)))?;
        self.writer
            .write_all(bytes)
            .map_err(|e| OrbitError::Io(format!("Failed to write {}: {}", name, e)))
    }

    fn add_directory(&mut self, name: &RelativePath) -> OrbitResult<()> {
        let dir_name = name.to_dir_name();
        debug!(entry = %dir_name, "Adding directory marker");
        self.writer
            .add_directory(dir_name.as_str(), self.options)
            .map_err(|e| OrbitError::Io(format!("Failed to add {}: {}", dir_name, e)))?;
        self.stats.directories += 1;
        Ok(())
    }

    fn add_file(&mut self, name: &RelativePath, source: &std::path::Path) -> OrbitResult<()> {
        let entry_name = name.to_archive_name();
        debug!(entry = %entry_name, "Adding file");

        let mut file = File::open(source)
            .map_err(|e| OrbitError::Io(format!("Failed to open {}: {}", source.display(), e)))?;
        self.writer
            .start_file(entry_name.as_str(), self.options)
            .map_err(|e| OrbitError::Io(format!("Failed to add {}: {}", entry_name, e)))?;
        let written = io::copy(&mut file, &mut self.writer)
            .map_err(|e| OrbitError::Io(format!("Failed to read {}: {}", source.display(), e)))?;

        self.stats.files += 1;
        self.stats.bytes += written;
        Ok(())
    }
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a complete container from registered roots, a manifest and an
/// optional software inventory
pub fn build_archive(
    mapper: &DirectoryMapper,
    manifest: &Manifest,
    inventory: Option<&[u8]>,
) -> OrbitResult<BuiltArchive> {
    let mut builder = ArchiveBuilder::new();
    builder.add_manifest(manifest)?;
    if let Some(inventory) = inventory {
        builder.add_inventory(inventory)?;
    }
    for root in mapper.roots() {
        builder.add_root(root)?;
    }

    let archive = builder.finish()?;
    info!(
        files = archive.stats.files,
        directories = archive.stats.directories,
        size = archive.bytes.len(),
        "Archive built"
    );
    Ok(archive)
}
