//! Local port forwarding
//!
//! Defines forwarding rules in the OpenSSH `LocalForward` value syntax and
//! runs them by spawning the system `ssh` client with `-N -L`; no SSH
//! protocol handling happens in-process.

mod manager;

pub use manager::{ForwardError, ForwardInfo, ForwardManager, ForwardStatus};

use serde::{Deserialize, Serialize};

/// One local port forwarding rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortForwardRule {
    /// Local bind address (default: localhost)
    pub bind_address: String,
    /// Local port
    pub local_port: u16,
    /// Remote host
    pub remote_host: String,
    /// Remote port
    pub remote_port: u16,
}

impl PortForwardRule {
    /// Parse from SSH config format: `[bind_address:]port host:hostport`
    pub fn parse(value: &str) -> Option<Self> {
        let parts: Vec<&str> = value.split_whitespace().collect();
        if parts.len() != 2 {
            return None;
        }

        // Local part: [bind_address:]port
        let (bind_address, local_port) = if parts[0].contains(':') {
            let local_parts: Vec<&str> = parts[0].rsplitn(2, ':').collect();
            if local_parts.len() == 2 {
                (local_parts[1].to_string(), local_parts[0].parse().ok()?)
            } else {
                return None;
            }
        } else {
            ("localhost".to_string(), parts[0].parse().ok()?)
        };

        // Remote part: host:hostport
        let remote_parts: Vec<&str> = parts[1].rsplitn(2, ':').collect();
        if remote_parts.len() != 2 {
            return None;
        }

        Some(PortForwardRule {
            bind_address,
            local_port,
            remote_host: remote_parts[1].to_string(),
            remote_port: remote_parts[0].parse().ok()?,
        })
    }

    /// Render the value passed to `ssh -L`
    pub fn to_ssh_argument(&self) -> String {
        format!(
            "{}:{}:{}:{}",
            self.bind_address, self.local_port, self.remote_host, self.remote_port
        )
    }
}

impl std::fmt::Display for PortForwardRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{} -> {}:{}",
            self.bind_address, self.local_port, self.remote_host, self.remote_port
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bare_port() {
        let rule = PortForwardRule::parse("8888 localhost:8888").unwrap();
        assert_eq!(rule.bind_address, "localhost");
        assert_eq!(rule.local_port, 8888);
        assert_eq!(rule.remote_host, "localhost");
        assert_eq!(rule.remote_port, 8888);
    }

    #[test]
    fn parse_with_bind_address() {
        let rule = PortForwardRule::parse("127.0.0.1:6006 localhost:6006").unwrap();
        assert_eq!(rule.bind_address, "127.0.0.1");
        assert_eq!(rule.local_port, 6006);
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!(PortForwardRule::parse("8888").is_none());
        assert!(PortForwardRule::parse("8888 nohostport").is_none());
        assert!(PortForwardRule::parse("notaport localhost:80").is_none());
        assert!(PortForwardRule::parse("80 host:notaport").is_none());
    }

    #[test]
    fn ssh_argument_rendering() {
        let rule = PortForwardRule::parse("127.0.0.1:8080 db.internal:5432").unwrap();
        assert_eq!(rule.to_ssh_argument(), "127.0.0.1:8080:db.internal:5432");
    }
}
