//! Container display formatting
//!
//! Formats backup reports, restore results and container summaries for
//! terminal output.

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::archive::{ArchiveEntry, RestoreResult};
use crate::backup::{BackupReport, ContainerInfo};

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "Entry")]
    name: String,
    #[tabled(rename = "Type")]
    kind: &'static str,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Compressed")]
    compressed: String,
}

/// Format archive entries as a table
pub fn format_entry_table(entries: &[ArchiveEntry]) -> String {
    if entries.is_empty() {
        return "Container has no entries.".to_string();
    }

    let rows = entries.iter().map(|entry| EntryRow {
        name: entry.name.clone(),
        kind: if entry.is_dir { "dir" } else { "file" },
        size: if entry.is_dir {
            String::new()
        } else {
            format_size(entry.size)
        },
        compressed: if entry.is_dir {
            String::new()
        } else {
            format_size(entry.compressed_size)
        },
    });

    let mut table = Table::new(rows);
    table.with(Style::sharp());
    table.to_string()
}

/// Format the result of `orbit read`
pub fn format_container_info(info: &ContainerInfo, list_entries: bool) -> String {
    let mut output = String::new();
    output.push_str("Backup Details\n");
    output.push_str("==============\n");
    output.push_str(&format!("File:      {}\n", info.path.display()));
    output.push_str(&format!("Size:      {}\n", format_size(info.size_bytes)));
    if let Some(modified) = info.modified {
        output.push_str(&format!("Modified:  {}\n", modified.format("%Y-%m-%d %H:%M:%S")));
    }
    output.push_str(&format!(
        "Encrypted: {}\n",
        if info.encrypted { "Yes" } else { "No" }
    ));

    let Some(summary) = &info.summary else {
        output.push('\n');
        output.push_str("Contents are encrypted. Pass --key <private key> to inspect them.\n");
        return output;
    };

    output.push('\n');
    output.push_str("Contents:\n");
    output.push_str(&format!("  Entries:           {}\n", summary.entries.len()));
    output.push_str(&format!(
        "  Uncompressed size: {}\n",
        format_size(summary.total_size)
    ));
    output.push_str(&format!("  Config files:      {}\n", summary.config_files));
    output.push_str(&format!(
        "  Manifest:          {}\n",
        if summary.has_manifest { "Yes" } else { "No" }
    ));
    match summary.inventory_count {
        Some(count) => output.push_str(&format!("  Software list:     Yes ({} entries)\n", count)),
        None if summary.has_inventory => {
            output.push_str("  Software list:     Yes (unreadable)\n")
        }
        None => output.push_str("  Software list:     No\n"),
    }

    if let Some(manifest) = &summary.manifest {
        output.push('\n');
        output.push_str("Manifest:\n");
        output.push_str(&format!("  Created:  {}\n", manifest.timestamp));
        output.push_str(&format!("  System:   {} ({})\n", manifest.os, manifest.arch));
        output.push_str(&format!("  Hostname: {}\n", manifest.hostname));
        output.push_str(&format!("  User:     {}\n", manifest.username));
    }

    if list_entries {
        output.push('\n');
        output.push_str(&format_entry_table(&summary.entries));
        output.push('\n');
    }

    output
}

/// Format the outcome of `orbit save`
pub fn format_backup_report(report: &BackupReport) -> String {
    let mut output = String::new();
    output.push_str(&format!("Backup created: {}\n", report.path.display()));
    output.push_str(&format!(
        "Size: {}{}\n",
        format_size(report.size_bytes),
        if report.encrypted { " (encrypted)" } else { "" }
    ));
    output.push_str(&format!(
        "Archived {} files in {} directories",
        report.stats.files, report.stats.directories
    ));
    if !report.groups.is_empty() {
        output.push_str(&format!(" from {}", report.groups.join(", ")));
    }
    output.push('\n');

    if let Some(count) = report.inventory_count {
        output.push_str(&format!("Software list: {} entries\n", count));
    }
    for root in &report.skipped_roots {
        output.push_str(&format!("Skipped missing directory: {}\n", root.display()));
    }
    for link in &report.stats.skipped_links {
        output.push_str(&format!("Skipped symbolic link: {}\n", link.display()));
    }
    for special in &report.stats.skipped_special {
        output.push_str(&format!("Skipped special file: {}\n", special.display()));
    }
    if !report.encrypted {
        output.push_str("Note: backup is not encrypted.\n");
    }
    output
}

/// Format the outcome of `orbit restore`
pub fn format_restore_result(result: &RestoreResult) -> String {
    let mut output = String::new();
    if let Some(manifest) = &result.manifest {
        output.push_str(&format!(
            "Backup from {} on {} ({})\n",
            manifest.username, manifest.hostname, manifest.timestamp
        ));
    }
    output.push_str(&result.summary());
    output.push('\n');
    for entry in &result.skipped {
        output.push_str(&format!("  not restored: {}\n", entry));
    }
    output
}

/// Human-readable byte size
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
