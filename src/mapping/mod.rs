//! Directory mapping between logical groups and filesystem roots
//!
//! - `RelativePath`: traversal-safe, segment-normalized relative paths
//! - `GroupMapping`: a group name with its backup and restore directories
//! - `DirectoryMapper`: forward (group -> archive root) and reverse
//!   (archive entry -> destination) resolution

mod group;
mod mapper;
mod relpath;

pub use group::{validate_group_name, GroupMapping};
pub use mapper::{DirectoryMapper, MappedRoot, ResolvedEntry};
pub use relpath::RelativePath;

/// Archive directory holding every group subtree
pub const CONFIGS_DIR: &str = "configs";
