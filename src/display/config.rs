//! Configuration display formatting

use std::path::Path;

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::config::UserConfig;

#[derive(Tabled)]
struct GroupRow {
    #[tabled(rename = "Group")]
    name: String,
    #[tabled(rename = "Backup from")]
    path: String,
    #[tabled(rename = "Restore to")]
    original_path: String,
    #[tabled(rename = "Exists")]
    exists: &'static str,
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn or_unset(value: &str) -> &str {
    if value.trim().is_empty() {
        "(not set)"
    } else {
        value
    }
}

/// Format the full configuration for `orbit config show`
pub fn format_config(config: &UserConfig, config_path: &Path) -> String {
    let mut output = String::new();
    output.push_str("Orbit Configuration\n");
    output.push_str("===================\n");
    output.push_str(&format!("Settings file: {}\n", config_path.display()));
    output.push_str(&format!("Last update:   {}\n", or_unset(&config.last_update)));
    output.push('\n');

    let system = &config.system;
    output.push_str("System:\n");
    output.push_str(&format!(
        "  Backup path:  {}\n",
        system.default_backup_path.display()
    ));
    output.push_str(&format!(
        "  Backups:      {} (last: {})\n",
        system.backup_count,
        or_unset(&system.last_backup_time)
    ));
    output.push_str(&format!(
        "  Restores:     {} (last: {})\n",
        system.restore_count,
        or_unset(&system.last_restore_time)
    ));
    output.push('\n');

    output.push_str("Configuration directories:\n");
    output.push_str(&format!(
        "  Backup enabled:      {}\n",
        yes_no(config.vscode.backup_setting)
    ));
    if !config.vscode.excluded_extensions.is_empty() {
        output.push_str(&format!(
            "  Excluded extensions: {}\n",
            config.vscode.excluded_extensions.join(", ")
        ));
    }
    if config.vscode.config_dirs.is_empty() {
        output.push_str("  (no groups defined)\n");
    } else {
        let rows = config.vscode.config_dirs.iter().map(|dir| GroupRow {
            name: dir.name.clone(),
            path: dir.path.display().to_string(),
            original_path: dir.original_path.display().to_string(),
            exists: yes_no(dir.path.is_dir()),
        });
        let mut table = Table::new(rows);
        table.with(Style::sharp());
        output.push_str(&table.to_string());
        output.push('\n');
    }
    output.push('\n');

    let software = &config.software;
    output.push_str("Software inventory:\n");
    output.push_str(&format!(
        "  Excluded patterns:  {}\n",
        software.excluded_patterns.join(", ")
    ));
    output.push_str(&format!(
        "  Include store apps: {}\n",
        yes_no(software.include_store_apps)
    ));
    output.push_str(&format!(
        "  Auto update list:   {}\n",
        yes_no(software.auto_update_list)
    ));
    output.push('\n');

    let encryption = &config.encryption;
    output.push_str("Encryption:\n");
    output.push_str(&format!("  Enabled:     {}\n", yes_no(encryption.enabled)));
    output.push_str(&format!(
        "  Public key:  {}\n",
        or_unset(&encryption.public_key_path)
    ));
    output.push_str(&format!(
        "  Private key: {}\n",
        or_unset(&encryption.private_key_path)
    ));
    output.push_str(&format!(
        "  Algorithm:   {}\n",
        or_unset(&encryption.default_algorithm)
    ));

    output
}

/// Format the issue list for `orbit config validate`
pub fn format_issues(issues: &[String]) -> String {
    if issues.is_empty() {
        return "Configuration is valid.".to_string();
    }

    let mut output = format!("Found {} issue(s):\n", issues.len());
    for (i, issue) in issues.iter().enumerate() {
        output.push_str(&format!("  {}. {}\n", i + 1, issue));
    }
    output.push_str("\nRun 'orbit config repair' to fix what can be fixed automatically.");
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_config_lists_groups() {
        let config = UserConfig::default();
        let text = format_config(&config, Path::new("/cfg/info.json"));

        assert!(text.contains("/cfg/info.json"));
        assert!(text.contains("APPDATA"));
        assert!(text.contains("USER"));
        assert!(text.contains("Public key:  (not set)"));
        assert!(text.contains("RSA-2048"));
    }

    #[test]
    fn test_format_issues() {
        assert_eq!(format_issues(&[]), "Configuration is valid.");

        let text = format_issues(&["one".to_string(), "two".to_string()]);
        assert!(text.starts_with("Found 2 issue(s):"));
        assert!(text.contains("  2. two"));
    }
}
