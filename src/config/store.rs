//! Host Config Store
//!
//! Reads the on-disk SSH client config into [`HostEntry`] records and
//! writes back a full replacement body that preserves everything outside
//! the managed section. The save path re-reads the file immediately before
//! generating, so manual edits made while the app is open survive.

use std::path::PathBuf;

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use super::generator::generate_config;
use super::parser::parse_config;
use super::paths::default_config_path;
use super::types::HostEntry;

/// Host config store errors
#[derive(Debug, thiserror::Error)]
pub enum HostStoreError {
    #[error("Failed to determine home directory")]
    NoHomeDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// Make the error serializable for the GUI bridge
impl serde::Serialize for HostStoreError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Store for the host entries declared in the SSH client config file.
///
/// The full entry set is reconstructed from disk on every [`load`]; the
/// caller holds the working set and passes the complete desired set to
/// [`save`] after each mutation. No incremental diffing is performed.
///
/// [`load`]: HostConfigStore::load
/// [`save`]: HostConfigStore::save
pub struct HostConfigStore {
    path: PathBuf,
    home: PathBuf,
}

impl HostConfigStore {
    /// Create a store for `~/.ssh/config`
    pub fn new() -> Result<Self, HostStoreError> {
        Ok(Self {
            path: default_config_path()?,
            home: dirs::home_dir().ok_or(HostStoreError::NoHomeDir)?,
        })
    }

    /// Create a store over explicit paths (for testing)
    pub fn with_paths(path: PathBuf, home: PathBuf) -> Self {
        Self { path, home }
    }

    /// Config file path
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Load all host entries from the config file.
    ///
    /// A missing file is an empty configuration, not an error.
    pub async fn load(&self) -> Result<Vec<HostEntry>, HostStoreError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No config file at {:?}, returning empty host list", self.path);
                return Ok(Vec::new());
            }
            Err(e) => return Err(HostStoreError::Io(e)),
        };

        let hosts = parse_config(&content, &self.home);
        debug!("Loaded {} host entries from {:?}", hosts.len(), self.path);
        Ok(hosts)
    }

    /// Save the complete desired host set.
    ///
    /// Re-reads the current file content to capture concurrent manual
    /// edits, splices the managed section, and rewrites the file
    /// atomically (temp file + rename).
    pub async fn save(&self, hosts: &[HostEntry]) -> Result<(), HostStoreError> {
        let existing = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(HostStoreError::Io(e)),
        };

        let content = generate_config(hosts, &existing, &self.home);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let _ = fs::set_permissions(parent, std::fs::Permissions::from_mode(0o700)).await;
            }
        }

        let temp_path = self.path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(content.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&temp_path, std::fs::Permissions::from_mode(0o600)).await?;
        }

        fs::rename(&temp_path, &self.path).await?;

        info!("Saved {} managed hosts to {:?}", hosts.len(), self.path);
        Ok(())
    }

    /// Copy the current config aside before a risky operation
    pub async fn backup(&self) -> Result<Option<PathBuf>, HostStoreError> {
        if fs::metadata(&self.path).await.is_err() {
            return Ok(None);
        }
        let backup_path = self.path.with_extension(format!(
            "backup.{}",
            chrono::Utc::now().format("%Y%m%d_%H%M%S")
        ));
        fs::copy(&self.path, &backup_path).await?;
        info!("Backed up config to {:?}", backup_path);
        Ok(Some(backup_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store_in(dir: &tempfile::TempDir) -> HostConfigStore {
        HostConfigStore::with_paths(
            dir.path().join("config"),
            dir.path().to_path_buf(),
        )
    }

    #[tokio::test]
    async fn load_missing_file_is_empty() {
        let temp = tempdir().unwrap();
        let store = store_in(&temp);
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_and_load_round_trip() {
        let temp = tempdir().unwrap();
        let store = store_in(&temp);

        let hosts = vec![
            HostEntry::new("prod", "prod.example.com")
                .with_user("deploy")
                .with_port(2222),
            HostEntry::new("staging", "staging.example.com"),
        ];
        store.save(&hosts).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, hosts);
    }

    #[tokio::test]
    async fn save_preserves_manual_edits_made_after_load() {
        let temp = tempdir().unwrap();
        let store = store_in(&temp);

        store
            .save(&[HostEntry::new("prod", "prod.example.com")])
            .await
            .unwrap();

        // A manual edit lands between load and save
        let manual = format!(
            "Host byhand\n    HostName byhand.example.com\n\n{}",
            fs::read_to_string(store.path()).await.unwrap()
        );
        fs::write(store.path(), &manual).await.unwrap();

        store
            .save(&[HostEntry::new("prod", "prod.example.com")])
            .await
            .unwrap();

        let content = fs::read_to_string(store.path()).await.unwrap();
        assert!(content.contains("Host byhand"));
        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.len(), 2);
    }

    #[tokio::test]
    async fn deleting_all_hosts_removes_managed_section() {
        let temp = tempdir().unwrap();
        let store = store_in(&temp);

        store
            .save(&[HostEntry::new("prod", "prod.example.com")])
            .await
            .unwrap();
        store.save(&[]).await.unwrap();

        let content = fs::read_to_string(store.path()).await.unwrap();
        assert!(!content.contains("Managed Hosts"));
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn identity_file_round_trips_through_home() {
        let temp = tempdir().unwrap();
        let store = store_in(&temp);
        let key_path = temp.path().join(".ssh/id_ed25519");

        let hosts = vec![HostEntry::new("prod", "prod.example.com")
            .with_identity_file(key_path.to_string_lossy())];
        store.save(&hosts).await.unwrap();

        let content = fs::read_to_string(store.path()).await.unwrap();
        assert!(content.contains("IdentityFile ~/.ssh/id_ed25519"));
        assert_eq!(store.load().await.unwrap(), hosts);
    }

    #[tokio::test]
    async fn backup_copies_current_file() {
        let temp = tempdir().unwrap();
        let store = store_in(&temp);

        assert!(store.backup().await.unwrap().is_none());

        store
            .save(&[HostEntry::new("prod", "prod.example.com")])
            .await
            .unwrap();
        let backup = store.backup().await.unwrap().unwrap();
        assert_eq!(
            fs::read_to_string(&backup).await.unwrap(),
            fs::read_to_string(store.path()).await.unwrap()
        );
    }
}
