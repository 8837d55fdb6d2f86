//! Host entry data model

use serde::{Deserialize, Serialize};

/// Default login user when the config file does not name one
pub const DEFAULT_USER: &str = "root";

/// Default SSH port
pub const DEFAULT_PORT: u16 = 22;

/// One declared SSH destination from the client config file.
///
/// `name` is the literal `Host` pattern token and acts as the unique key.
/// Wildcard patterns (`*`, `?`) are never represented as entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostEntry {
    /// Host alias (the token after `Host`)
    pub name: String,
    /// Target address or DNS name (`HostName` directive)
    pub hostname: String,
    /// Login name (`User` directive), defaults to `root`
    #[serde(default = "default_user")]
    pub user: String,
    /// Port (`Port` directive), defaults to 22
    #[serde(default = "default_port")]
    pub port: u16,
    /// Private key path (`IdentityFile` directive), home-expanded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_file: Option<String>,
}

fn default_user() -> String {
    DEFAULT_USER.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl HostEntry {
    /// Create an entry with default user and port
    pub fn new(name: impl Into<String>, hostname: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hostname: hostname.into(),
            user: DEFAULT_USER.to_string(),
            port: DEFAULT_PORT,
            identity_file: None,
        }
    }

    /// Set the login user
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    /// Set the port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the identity file path
    pub fn with_identity_file(mut self, path: impl Into<String>) -> Self {
        self.identity_file = Some(path.into());
        self
    }

    /// SSH destination string (`user@hostname`) for display
    pub fn connection_string(&self) -> String {
        format!("{}@{}", self.user, self.hostname)
    }
}
