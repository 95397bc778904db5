//! End-to-end tests for the `orbit` binary

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;

fn orbit(config_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("orbit").unwrap();
    cmd.env("ORBIT_CONFIG_DIR", config_dir).arg("--quiet");
    cmd
}

/// Write a settings file with one group backed up from `source` and
/// restored into `target`
fn write_settings(config_dir: &Path, backup_dir: &Path, source: &Path, target: &Path) {
    fs::create_dir_all(config_dir).unwrap();
    let settings = json!({
        "system": {
            "last_backup_time": "",
            "backup_count": 0,
            "default_backup_path": backup_dir,
        },
        "vscode": {
            "config_dirs": [
                { "name": "APPDATA", "path": source, "original_path": target }
            ],
            "excluded_extensions": [],
            "backup_setting": true,
        },
        "software": {
            "excluded_patterns": [],
            "include_store_apps": false,
            "auto_update_list": true,
        },
        "encryption": {
            "enabled": false,
            "public_key_path": "",
            "private_key_path": "",
            "default_algorithm": "RSA-2048",
        },
        "last_update": "",
    });
    fs::write(
        config_dir.join("info.json"),
        serde_json::to_string_pretty(&settings).unwrap(),
    )
    .unwrap();
}

fn populate_source(source: &Path) {
    fs::create_dir_all(source.join("Code/User")).unwrap();
    fs::write(source.join("Code/User/settings.json"), "{\"editor.fontSize\": 14}").unwrap();
    fs::write(source.join("Code/keybindings.json"), "[]").unwrap();
}

#[test]
fn test_first_run_creates_settings() {
    let temp = TempDir::new().unwrap();
    let config_dir = temp.path().join("orbit_user");

    orbit(&config_dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Orbit Configuration"))
        .stdout(predicate::str::contains("APPDATA"));

    assert!(config_dir.join("info.json").exists());
    assert!(config_dir.join("keys").is_dir());
}

#[test]
fn test_validate_reports_missing_keys() {
    let temp = TempDir::new().unwrap();

    orbit(temp.path())
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("key path is empty"));
}

#[test]
fn test_repair_disables_encryption_without_keys() {
    let temp = TempDir::new().unwrap();

    orbit(temp.path())
        .args(["config", "repair"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Applied"));

    let saved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(temp.path().join("info.json")).unwrap()).unwrap();
    assert_eq!(saved["encryption"]["enabled"], json!(false));
}

#[test]
fn test_set_unknown_key_fails() {
    let temp = TempDir::new().unwrap();

    orbit(temp.path())
        .args(["config", "set", "colour", "blue"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown configuration key"));
}

#[test]
fn test_set_rejected_by_validation_keeps_file() {
    let temp = TempDir::new().unwrap();
    let config_dir = temp.path().join("cfg");
    let work = temp.path().join("work");
    fs::create_dir_all(&work).unwrap();
    write_settings(&config_dir, &work, &work.join("src"), &work.join("dst"));
    let before = fs::read_to_string(config_dir.join("info.json")).unwrap();

    // Enabling encryption without key paths breaks an invariant
    orbit(&config_dir)
        .args(["config", "set", "encryption-enabled", "true"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Validation error"));

    assert_eq!(fs::read_to_string(config_dir.join("info.json")).unwrap(), before);
}

#[test]
fn test_set_rejects_misspelled_boolean() {
    let temp = TempDir::new().unwrap();
    let config_dir = temp.path().join("cfg");
    let work = temp.path().join("work");
    fs::create_dir_all(&work).unwrap();
    write_settings(&config_dir, &work, &work.join("src"), &work.join("dst"));

    orbit(&config_dir)
        .args(["config", "set", "backup-setting", "ture"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid value 'ture'"));

    let saved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(config_dir.join("info.json")).unwrap()).unwrap();
    assert_eq!(saved["vscode"]["backup_setting"], json!(true));
}

#[test]
fn test_read_missing_file_fails() {
    let temp = TempDir::new().unwrap();

    orbit(temp.path())
        .args(["read"])
        .arg(temp.path().join("nope.orbit"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Backup file not found"));
}

#[test]
fn test_save_read_restore_plain() {
    let temp = TempDir::new().unwrap();
    let config_dir = temp.path().join("cfg");
    let backups = temp.path().join("backups");
    let source = temp.path().join("source");
    let target = temp.path().join("target");
    fs::create_dir_all(&backups).unwrap();
    populate_source(&source);
    write_settings(&config_dir, &backups, &source, &target);

    orbit(&config_dir)
        .arg("save")
        .assert()
        .success()
        .stdout(predicate::str::contains("Backup created"));

    let container = backups.join("backup.orbit");
    assert!(container.exists());

    orbit(&config_dir)
        .args(["read", "--list"])
        .arg(&container)
        .assert()
        .success()
        .stdout(predicate::str::contains("configs/APPDATA/source/Code/User/settings.json"));

    orbit(&config_dir)
        .arg("restore")
        .arg(&container)
        .assert()
        .success()
        .stdout(predicate::str::contains("Restore complete!"));

    assert_eq!(
        fs::read_to_string(target.join("Code/User/settings.json")).unwrap(),
        "{\"editor.fontSize\": 14}"
    );
    assert_eq!(fs::read_to_string(target.join("Code/keybindings.json")).unwrap(), "[]");

    let saved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(config_dir.join("info.json")).unwrap()).unwrap();
    assert_eq!(saved["system"]["backup_count"], json!(1));
    assert_eq!(saved["system"]["restore_count"], json!(1));
}

#[test]
fn test_gen_keys_then_encrypted_round_trip() {
    let temp = TempDir::new().unwrap();
    let config_dir = temp.path().join("cfg");
    let backups = temp.path().join("backups");
    let source = temp.path().join("source");
    let target = temp.path().join("target");
    let keys = temp.path().join("keys");
    fs::create_dir_all(&backups).unwrap();
    populate_source(&source);
    write_settings(&config_dir, &backups, &source, &target);

    orbit(&config_dir)
        .args(["gen-keys", "--prefix", "tester", "--force", "--dir"])
        .arg(&keys)
        .assert()
        .success()
        .stdout(predicate::str::contains("Encryption enabled"));

    let private_key = keys.join("tester_private_key.pem");
    assert!(private_key.exists());
    assert!(keys.join("tester_public_key.pem").exists());

    let container = temp.path().join("sealed.orbit");
    orbit(&config_dir)
        .arg("save")
        .arg("--output")
        .arg(&container)
        .assert()
        .success()
        .stdout(predicate::str::contains("(encrypted)"));

    let sealed = fs::read(&container).unwrap();
    assert!(sealed.starts_with(b"ORBIT_ENCRYPTED_v1.0\n"));

    // Without the private key nothing is restored
    orbit(&config_dir)
        .arg("restore")
        .arg(&container)
        .assert()
        .failure()
        .stderr(predicate::str::contains("is encrypted"));
    assert!(!target.exists());

    orbit(&config_dir)
        .arg("restore")
        .arg(&container)
        .arg("--key")
        .arg(&private_key)
        .assert()
        .success();

    assert_eq!(fs::read_to_string(target.join("Code/keybindings.json")).unwrap(), "[]");
}
