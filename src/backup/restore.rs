//! Restore functionality for Orbit
//!
//! Opens a container file, decrypting it with an explicitly supplied private
//! key when it carries the envelope header, and extracts the configured
//! groups back to their original locations. Decrypted bytes only ever live
//! in memory and are wiped when dropped.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Local};
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::archive::{extract_archive, ArchiveReader, ArchiveSummary, RestoreResult};
use crate::config::ConfigManager;
use crate::crypto::{decrypt, is_encrypted, load_private_key};
use crate::error::{OrbitError, OrbitResult};

/// Header-level facts about a container file, plus its contents when readable
#[derive(Debug, Clone)]
pub struct ContainerInfo {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub modified: Option<DateTime<Local>>,
    pub encrypted: bool,
    /// `None` for an encrypted container opened without a key
    pub summary: Option<ArchiveSummary>,
}

/// Read a container and return its plain ZIP bytes
///
/// Encrypted containers require `private_key`; it is never looked up.
pub fn open_container(path: &Path, private_key: Option<&Path>) -> OrbitResult<Zeroizing<Vec<u8>>> {
    let data = read_container(path)?;
    unwrap_container(path, data, private_key)
}

fn unwrap_container(
    path: &Path,
    data: Vec<u8>,
    private_key: Option<&Path>,
) -> OrbitResult<Zeroizing<Vec<u8>>> {
    if !is_encrypted(&data) {
        if private_key.is_some() {
            debug!(path = %path.display(), "Container is not encrypted; ignoring private key");
        }
        return Ok(Zeroizing::new(data));
    }

    let key_path = private_key.ok_or_else(|| OrbitError::key_required(path))?;
    info!(path = %path.display(), "Decrypting container");
    let key = load_private_key(key_path)?;
    decrypt(&data, &key)
}

/// Describe a container without restoring it
pub fn inspect_container(path: &Path, private_key: Option<&Path>) -> OrbitResult<ContainerInfo> {
    let metadata = fs::metadata(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => OrbitError::backup_not_found(path),
        _ => OrbitError::Io(format!("Failed to stat {}: {}", path.display(), e)),
    })?;
    let modified = metadata.modified().ok().map(DateTime::<Local>::from);

    let data = read_container(path)?;
    let encrypted = is_encrypted(&data);

    let summary = if encrypted && private_key.is_none() {
        None
    } else {
        let plain = unwrap_container(path, data, private_key)?;
        Some(ArchiveReader::new(&plain)?.summarize()?)
    };

    Ok(ContainerInfo {
        path: path.to_path_buf(),
        size_bytes: metadata.len(),
        modified,
        encrypted,
        summary,
    })
}

fn read_container(path: &Path) -> OrbitResult<Vec<u8>> {
    fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => OrbitError::backup_not_found(path),
        _ => OrbitError::Io(format!("Failed to read {}: {}", path.display(), e)),
    })
}

/// Restores containers into the configured group directories
pub struct RestoreManager {
    config: Arc<ConfigManager>,
}

impl RestoreManager {
    /// Create a new RestoreManager
    pub fn new(config: Arc<ConfigManager>) -> Self {
        Self { config }
    }

    /// Restore from a specific container file
    pub fn restore_from_file(
        &self,
        path: &Path,
        private_key: Option<&Path>,
    ) -> OrbitResult<RestoreResult> {
        let config = self.config.get()?;
        let plain = open_container(path, private_key)?;

        let result = extract_archive(&plain, &config.vscode.config_dirs)?;
        if let Some(manifest) = &result.manifest {
            info!(
                created = %manifest.timestamp,
                host = %manifest.hostname,
                user = %manifest.username,
                "Restored backup"
            );
        }

        if let Err(e) = self.config.record_restore() {
            warn!("Failed to update restore statistics: {}", e);
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::{build_archive, Manifest};
    use crate::crypto::fixture::generate_insecure_fixture_keypair;
    use crate::crypto::{encrypt, KeyManager};
    use crate::mapping::{DirectoryMapper, GroupMapping};
    use tempfile::TempDir;

    struct Fixture {
        temp: TempDir,
        config: Arc<ConfigManager>,
        source: PathBuf,
        target: PathBuf,
        container: Vec<u8>,
    }

    fn fixture() -> Fixture {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("src").join("Code");
        let target = temp.path().join("dst").join("Code");
        fs::create_dir_all(source.join("User")).unwrap();
        fs::write(source.join("User").join("settings.json"), "X").unwrap();

        let mut mapper = DirectoryMapper::new();
        mapper.register(GroupMapping::in_place("APPDATA", &source)).unwrap();
        let container = build_archive(&mapper, &Manifest::capture(), None).unwrap().bytes;

        let config = Arc::new(ConfigManager::new(temp.path().join("info.json")));
        config.load().unwrap();
        let mapping = GroupMapping::new("APPDATA", &source, &target);
        config
            .update(|c| {
                c.vscode.config_dirs = vec![mapping];
                c.encryption.enabled = false;
            })
            .unwrap();

        Fixture {
            temp,
            config,
            source,
            target,
            container,
        }
    }

    #[test]
    fn test_restore_plain_container() {
        let fx = fixture();
        let path = fx.temp.path().join("backup.orbit");
        fs::write(&path, &fx.container).unwrap();

        let result = RestoreManager::new(Arc::clone(&fx.config))
            .restore_from_file(&path, None)
            .unwrap();

        assert_eq!(result.files_restored, 1);
        assert_eq!(
            fs::read_to_string(fx.target.join("User").join("settings.json")).unwrap(),
            "X"
        );
        assert!(fx.source.exists());
        assert_eq!(fx.config.get().unwrap().system.restore_count, 1);
    }

    #[test]
    fn test_encrypted_container_requires_key() {
        let fx = fixture();
        let keys = KeyManager::new(fx.temp.path().join("keys"));
        let pair = generate_insecure_fixture_keypair("restore").unwrap();
        let paths = keys.save("tester", &pair).unwrap();

        let path = fx.temp.path().join("backup.orbit");
        fs::write(&path, encrypt(&fx.container, &pair.public_key).unwrap()).unwrap();
        let manager = RestoreManager::new(Arc::clone(&fx.config));

        let err = manager.restore_from_file(&path, None).unwrap_err();
        assert!(err.is_not_found());
        assert!(!fx.target.exists());

        manager
            .restore_from_file(&path, Some(&paths.private_key))
            .unwrap();
        assert!(fx.target.join("User").join("settings.json").exists());
    }

    #[test]
    fn test_wrong_key_restores_nothing() {
        let fx = fixture();
        let keys = KeyManager::new(fx.temp.path().join("keys"));
        let pair = generate_insecure_fixture_keypair("restore").unwrap();
        let other = keys
            .save("other", &generate_insecure_fixture_keypair("unrelated").unwrap())
            .unwrap();

        let path = fx.temp.path().join("backup.orbit");
        fs::write(&path, encrypt(&fx.container, &pair.public_key).unwrap()).unwrap();

        let err = RestoreManager::new(Arc::clone(&fx.config))
            .restore_from_file(&path, Some(&other.private_key))
            .unwrap_err();
        assert!(err.is_crypto());
        assert!(!fx.target.exists());
        assert_eq!(fx.config.get().unwrap().system.restore_count, 0);
    }

    #[test]
    fn test_inspect() {
        let fx = fixture();
        let pair = generate_insecure_fixture_keypair("restore").unwrap();
        let paths = KeyManager::new(fx.temp.path().join("keys"))
            .save("tester", &pair)
            .unwrap();

        let plain_path = fx.temp.path().join("plain.orbit");
        fs::write(&plain_path, &fx.container).unwrap();
        let info = inspect_container(&plain_path, None).unwrap();
        assert!(!info.encrypted);
        assert_eq!(info.summary.unwrap().config_files, 1);

        let sealed_path = fx.temp.path().join("sealed.orbit");
        fs::write(&sealed_path, encrypt(&fx.container, &pair.public_key).unwrap()).unwrap();
        let info = inspect_container(&sealed_path, None).unwrap();
        assert!(info.encrypted);
        assert!(info.summary.is_none());

        let info = inspect_container(&sealed_path, Some(&paths.private_key)).unwrap();
        assert!(info.summary.unwrap().has_manifest);

        let missing = inspect_container(&fx.temp.path().join("nope.orbit"), None).unwrap_err();
        assert!(missing.is_not_found());
    }
}
