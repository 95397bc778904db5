//! Display formatting for terminal output
//!
//! Provides utilities for formatting containers, backup results and the
//! configuration for terminal display.

pub mod config;
pub mod container;

pub use config::{format_config, format_issues};
pub use container::{
    format_backup_report, format_container_info, format_entry_table, format_restore_result,
    format_size,
};
