//! Known hosts management
//!
//! Lists the entries of `~/.ssh/known_hosts` for display and removes hosts
//! by delegating to `ssh-keygen -R`, which also handles hashed hostnames.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::known_hosts_path;
use crate::config::HostStoreError;

/// Known hosts errors
#[derive(Debug, thiserror::Error)]
pub enum KnownHostsError {
    #[error("Failed to determine home directory")]
    NoHomeDir,

    #[error("ssh-keygen failed: {0}")]
    CommandFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<HostStoreError> for KnownHostsError {
    fn from(err: HostStoreError) -> Self {
        match err {
            HostStoreError::NoHomeDir => KnownHostsError::NoHomeDir,
            HostStoreError::Io(e) => KnownHostsError::Io(e),
        }
    }
}

impl serde::Serialize for KnownHostsError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// One line of the known_hosts file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownHostEntry {
    /// Hostname field as written (may be comma-separated aliases or a
    /// `|1|...` hash)
    pub host: String,
    /// Key algorithm (e.g. `ssh-ed25519`)
    pub key_type: String,
    /// Base64 key material
    pub key_data: String,
    /// Whether the hostname is hashed and cannot be displayed
    pub hashed: bool,
}

/// Parse known_hosts content into entries.
///
/// Comments, blank lines, and lines with fewer than three fields are
/// skipped. Hashed hostnames are kept and flagged rather than reversed.
pub fn parse_known_hosts(content: &str) -> Vec<KnownHostEntry> {
    let mut entries = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut parts = line.split_whitespace();
        let (Some(host), Some(key_type), Some(key_data)) =
            (parts.next(), parts.next(), parts.next())
        else {
            continue;
        };

        entries.push(KnownHostEntry {
            host: host.to_string(),
            key_type: key_type.to_string(),
            key_data: key_data.to_string(),
            hashed: host.starts_with('|'),
        });
    }
    entries
}

/// Manages the known_hosts file
pub struct KnownHostsManager {
    path: PathBuf,
}

impl KnownHostsManager {
    /// Create a manager for `~/.ssh/known_hosts`
    pub fn new() -> Result<Self, KnownHostsError> {
        Ok(Self {
            path: known_hosts_path()?,
        })
    }

    /// Create a manager over an explicit path (for testing)
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Known hosts file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// List all entries. A missing file yields an empty list.
    pub async fn list(&self) -> Result<Vec<KnownHostEntry>, KnownHostsError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(KnownHostsError::Io(e)),
        };

        let entries = parse_known_hosts(&content);
        debug!("Loaded {} known host entries from {:?}", entries.len(), self.path);
        Ok(entries)
    }

    /// Remove all keys for a host via `ssh-keygen -R`.
    ///
    /// For non-standard ports pass the host in `[host]:port` form, as the
    /// file itself does.
    pub async fn remove_host(&self, host: &str) -> Result<(), KnownHostsError> {
        let output = Command::new("ssh-keygen")
            .arg("-R")
            .arg(host)
            .arg("-f")
            .arg(&self.path)
            .output()
            .await?;

        if !output.status.success() {
            return Err(KnownHostsError::CommandFailed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        info!("Removed {} from {:?}", host, self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn parse_skips_comments_and_short_lines() {
        let content = "# comment\n\ngithub.com ssh-ed25519 AAAAC3Nza key-comment\nbroken-line\n[gitlab.com]:2222 ssh-rsa AAAAB3Nza\n";
        let entries = parse_known_hosts(content);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].host, "github.com");
        assert_eq!(entries[0].key_type, "ssh-ed25519");
        assert!(!entries[0].hashed);
        assert_eq!(entries[1].host, "[gitlab.com]:2222");
    }

    #[test]
    fn parse_flags_hashed_entries() {
        let entries = parse_known_hosts("|1|salt|hash ssh-ed25519 AAAA\n");
        assert_eq!(entries.len(), 1);
        assert!(entries[0].hashed);
    }

    #[tokio::test]
    async fn list_missing_file_is_empty() {
        let temp = tempdir().unwrap();
        let manager = KnownHostsManager::with_path(temp.path().join("known_hosts"));
        assert!(manager.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_reads_entries() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("known_hosts");
        fs::write(&path, "example.com ssh-ed25519 AAAA\n").await.unwrap();

        let manager = KnownHostsManager::with_path(path);
        let entries = manager.list().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].host, "example.com");
    }
}
