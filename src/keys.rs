//! SSH key pair management
//!
//! Thin wrapper around the system `ssh-keygen` binary and the key files in
//! `~/.ssh`. Listing is a pure directory scan; generation, fingerprinting,
//! and known-hosts removal all delegate to `ssh-keygen` verbatim.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::process::Command;
use tracing::{debug, info};

/// Key management errors
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("Key already exists: {0}")]
    AlreadyExists(String),

    #[error("Key not found: {0}")]
    NotFound(String),

    #[error("ssh-keygen failed: {0}")]
    CommandFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl serde::Serialize for KeyError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Supported key algorithms for generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyType {
    Ed25519,
    Rsa,
    Ecdsa,
}

impl KeyType {
    /// Argument value for `ssh-keygen -t`
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyType::Ed25519 => "ed25519",
            KeyType::Rsa => "rsa",
            KeyType::Ecdsa => "ecdsa",
        }
    }
}

/// One key pair found in the SSH directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SshKeyInfo {
    /// File stem (e.g. `id_ed25519`)
    pub name: String,
    /// Algorithm name from the public key line (e.g. `ssh-ed25519`)
    pub key_type: String,
    /// Trailing comment from the public key line, if any
    pub comment: Option<String>,
    /// Private key path
    pub path: String,
    /// Public key path
    pub public_key_path: String,
}

/// Parse a `type base64 [comment]` public key line
fn parse_public_key_line(line: &str) -> Option<(String, Option<String>)> {
    let mut parts = line.trim().split_whitespace();
    let key_type = parts.next()?.to_string();
    let _key_data = parts.next()?;
    let comment = parts.collect::<Vec<_>>().join(" ");
    let comment = if comment.is_empty() { None } else { Some(comment) };
    Some((key_type, comment))
}

/// List key pairs in the given SSH directory.
///
/// A key pair is a `<name>.pub` file whose private counterpart `<name>`
/// exists alongside it. A missing directory yields an empty list.
pub async fn list_keys(dir: &Path) -> Result<Vec<SshKeyInfo>, KeyError> {
    let mut read_dir = match fs::read_dir(dir).await {
        Ok(rd) => rd,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(KeyError::Io(e)),
    };

    let mut keys = Vec::new();
    while let Some(entry) = read_dir.next_entry().await? {
        let pub_path = entry.path();
        if pub_path.extension().and_then(|e| e.to_str()) != Some("pub") {
            continue;
        }
        let private_path = pub_path.with_extension("");
        if fs::metadata(&private_path).await.is_err() {
            continue;
        }

        let Ok(content) = fs::read_to_string(&pub_path).await else {
            continue;
        };
        let Some((key_type, comment)) =
            content.lines().next().and_then(parse_public_key_line)
        else {
            continue;
        };

        let name = private_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        keys.push(SshKeyInfo {
            name,
            key_type,
            comment,
            path: private_path.to_string_lossy().into_owned(),
            public_key_path: pub_path.to_string_lossy().into_owned(),
        });
    }

    keys.sort_by(|a, b| a.name.cmp(&b.name));
    debug!("Found {} key pairs in {:?}", keys.len(), dir);
    Ok(keys)
}

/// Generate a new key pair via `ssh-keygen`.
///
/// Refuses to overwrite an existing key with the same name. An empty
/// `passphrase` produces an unencrypted key, matching `ssh-keygen -N ""`.
pub async fn generate_key(
    dir: &Path,
    name: &str,
    key_type: KeyType,
    comment: &str,
    passphrase: &str,
) -> Result<SshKeyInfo, KeyError> {
    let key_path = dir.join(name);
    if fs::metadata(&key_path).await.is_ok() {
        return Err(KeyError::AlreadyExists(key_path.display().to_string()));
    }

    fs::create_dir_all(dir).await?;

    let output = Command::new("ssh-keygen")
        .arg("-t")
        .arg(key_type.as_str())
        .arg("-f")
        .arg(&key_path)
        .arg("-N")
        .arg(passphrase)
        .arg("-C")
        .arg(comment)
        .arg("-q")
        .output()
        .await?;

    if !output.status.success() {
        return Err(KeyError::CommandFailed(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }

    info!("Generated {} key {:?}", key_type.as_str(), key_path);

    let comment = if comment.is_empty() {
        None
    } else {
        Some(comment.to_string())
    };
    Ok(SshKeyInfo {
        name: name.to_string(),
        key_type: format!("ssh-{}", key_type.as_str()),
        comment,
        path: key_path.to_string_lossy().into_owned(),
        public_key_path: format!("{}.pub", key_path.display()),
    })
}

/// SHA256 fingerprint of a key, via `ssh-keygen -l`
pub async fn fingerprint(key_path: &Path) -> Result<String, KeyError> {
    let output = Command::new("ssh-keygen")
        .arg("-l")
        .arg("-f")
        .arg(key_path)
        .output()
        .await?;

    if !output.status.success() {
        return Err(KeyError::CommandFailed(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Delete a key pair (private and public file)
pub async fn delete_key(dir: &Path, name: &str) -> Result<(), KeyError> {
    let private_path = dir.join(name);
    let pub_path = PathBuf::from(format!("{}.pub", private_path.display()));

    if fs::metadata(&private_path).await.is_err() {
        return Err(KeyError::NotFound(private_path.display().to_string()));
    }

    fs::remove_file(&private_path).await?;
    if fs::metadata(&pub_path).await.is_ok() {
        fs::remove_file(&pub_path).await?;
    }

    info!("Deleted key pair {:?}", private_path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn write_key_pair(dir: &Path, name: &str, pub_line: &str) {
        fs::write(dir.join(name), "PRIVATE KEY").await.unwrap();
        fs::write(dir.join(format!("{}.pub", name)), pub_line)
            .await
            .unwrap();
    }

    #[test]
    fn public_key_line_parsing() {
        let (key_type, comment) =
            parse_public_key_line("ssh-ed25519 AAAAC3Nza alice@laptop").unwrap();
        assert_eq!(key_type, "ssh-ed25519");
        assert_eq!(comment.as_deref(), Some("alice@laptop"));

        let (key_type, comment) = parse_public_key_line("ssh-rsa AAAAB3Nza").unwrap();
        assert_eq!(key_type, "ssh-rsa");
        assert!(comment.is_none());

        assert!(parse_public_key_line("just-one-token").is_none());
    }

    #[tokio::test]
    async fn list_missing_dir_is_empty() {
        let temp = tempdir().unwrap();
        let keys = list_keys(&temp.path().join("nope")).await.unwrap();
        assert!(keys.is_empty());
    }

    #[tokio::test]
    async fn list_pairs_only() {
        let temp = tempdir().unwrap();
        write_key_pair(temp.path(), "id_ed25519", "ssh-ed25519 AAAA alice@laptop").await;
        // Orphan public key without a private counterpart
        fs::write(temp.path().join("orphan.pub"), "ssh-rsa AAAA")
            .await
            .unwrap();
        // Unrelated files are skipped
        fs::write(temp.path().join("config"), "Host a\n").await.unwrap();
        fs::write(temp.path().join("known_hosts"), "").await.unwrap();

        let keys = list_keys(temp.path()).await.unwrap();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].name, "id_ed25519");
        assert_eq!(keys[0].key_type, "ssh-ed25519");
        assert_eq!(keys[0].comment.as_deref(), Some("alice@laptop"));
    }

    #[tokio::test]
    async fn delete_removes_both_files() {
        let temp = tempdir().unwrap();
        write_key_pair(temp.path(), "id_rsa", "ssh-rsa AAAA").await;

        delete_key(temp.path(), "id_rsa").await.unwrap();
        assert!(fs::metadata(temp.path().join("id_rsa")).await.is_err());
        assert!(fs::metadata(temp.path().join("id_rsa.pub")).await.is_err());
    }

    #[tokio::test]
    async fn delete_missing_key_errors() {
        let temp = tempdir().unwrap();
        let err = delete_key(temp.path(), "ghost").await.unwrap_err();
        assert!(matches!(err, KeyError::NotFound(_)));
    }

    #[tokio::test]
    async fn generate_refuses_overwrite() {
        let temp = tempdir().unwrap();
        write_key_pair(temp.path(), "id_ed25519", "ssh-ed25519 AAAA").await;

        let err = generate_key(temp.path(), "id_ed25519", KeyType::Ed25519, "", "")
            .await
            .unwrap_err();
        assert!(matches!(err, KeyError::AlreadyExists(_)));
    }
}
