//! SSH directory path helpers
//!
//! Resolves the per-user `~/.ssh` directory and handles the `~` prefix
//! convention used by `IdentityFile` values in the config file.

use std::path::{Path, PathBuf};

use super::store::HostStoreError;

/// Get the per-user SSH directory (`~/.ssh`)
pub fn ssh_dir() -> Result<PathBuf, HostStoreError> {
    dirs::home_dir()
        .map(|home| home.join(".ssh"))
        .ok_or(HostStoreError::NoHomeDir)
}

/// Get the default SSH client config path (`~/.ssh/config`)
pub fn default_config_path() -> Result<PathBuf, HostStoreError> {
    Ok(ssh_dir()?.join("config"))
}

/// Get the default known_hosts path (`~/.ssh/known_hosts`)
pub fn known_hosts_path() -> Result<PathBuf, HostStoreError> {
    Ok(ssh_dir()?.join("known_hosts"))
}

/// Expand a leading `~` in a config value to the given home directory.
///
/// Values without a `~` prefix are returned unchanged.
pub fn expand_home(value: &str, home: &Path) -> String {
    if value == "~" {
        return home.to_string_lossy().into_owned();
    }
    match value.strip_prefix("~/") {
        Some(rest) => home.join(rest).to_string_lossy().into_owned(),
        None => value.to_string(),
    }
}

/// Collapse an absolute path back to the `~/` form, but only when the path
/// actually lies inside the home directory.
pub fn collapse_home(value: &str, home: &Path) -> String {
    let path = Path::new(value);
    match path.strip_prefix(home) {
        Ok(rest) if rest.as_os_str().is_empty() => "~".to_string(),
        Ok(rest) => format!("~/{}", rest.to_string_lossy()),
        Err(_) => value.to_string(),
    }
}
