//! Backup container format
//!
//! A container is a ZIP archive with `manifest.json` and an optional
//! `software-list.json` at its root and one subtree per group root under
//! `configs/<group>/<directory name>/`.

pub mod builder;
pub mod inventory;
pub mod manifest;
pub mod reader;

pub use builder::{build_archive, ArchiveBuilder, BuildStats, BuiltArchive};
pub use inventory::{Software, SoftwareList, INVENTORY_FILE};
pub use manifest::{current_username, Manifest, MANIFEST_FILE};
pub use reader::{extract_archive, ArchiveEntry, ArchiveReader, ArchiveSummary, RestoreResult};
