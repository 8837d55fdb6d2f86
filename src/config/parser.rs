//! SSH client config parser
//!
//! Reads the OpenSSH `~/.ssh/config` format into [`HostEntry`] records.
//! Only literal host names are materialized; wildcard patterns (`Host *`,
//! `Host dev-?`) are consumed but produce no entry. The parser is total:
//! malformed lines are skipped, never fatal.

use std::path::Path;

use super::paths::expand_home;
use super::types::{HostEntry, DEFAULT_PORT, DEFAULT_USER};

/// One-slot accumulator for the host stanza currently being read
#[derive(Default)]
struct PendingHost {
    name: String,
    hostname: Option<String>,
    user: Option<String>,
    port: Option<u16>,
    identity_file: Option<String>,
}

impl PendingHost {
    /// Materialize the accumulator, if it captured a hostname.
    fn into_entry(self) -> Option<HostEntry> {
        let hostname = self.hostname?;
        Some(HostEntry {
            name: self.name,
            hostname,
            user: self.user.unwrap_or_else(|| DEFAULT_USER.to_string()),
            port: self.port.unwrap_or(DEFAULT_PORT),
            identity_file: self.identity_file,
        })
    }
}

/// Flush a pending accumulator into the output list.
///
/// The last occurrence of a duplicate name wins, but keeps the position of
/// the first occurrence so output order stays first-encountered order.
fn flush(pending: Option<PendingHost>, hosts: &mut Vec<HostEntry>) {
    let Some(entry) = pending.and_then(PendingHost::into_entry) else {
        return;
    };
    match hosts.iter().position(|h| h.name == entry.name) {
        Some(idx) => hosts[idx] = entry,
        None => hosts.push(entry),
    }
}

/// Parse SSH config content into host entries.
///
/// `home` is the directory substituted for a leading `~` in
/// `IdentityFile` values.
pub fn parse_config(content: &str, home: &Path) -> Vec<HostEntry> {
    let mut hosts = Vec::new();
    let mut pending: Option<PendingHost> = None;

    for line in content.lines() {
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        // Tokenize on whitespace runs: key (case-folded) + value (rest)
        let mut tokens = trimmed.split_whitespace();
        let Some(key) = tokens.next() else { continue };
        let value = tokens.collect::<Vec<_>>().join(" ");
        if value.is_empty() {
            continue;
        }
        let key = key.to_lowercase();

        if key == "host" {
            flush(pending.take(), &mut hosts);
            // Wildcard patterns start a stanza whose attributes attach to
            // nothing
            if !value.contains('*') && !value.contains('?') {
                pending = Some(PendingHost {
                    name: value,
                    ..Default::default()
                });
            }
        } else if let Some(ref mut host) = pending {
            match key.as_str() {
                "hostname" => host.hostname = Some(value),
                "user" => host.user = Some(value),
                "port" => host.port = Some(value.parse().unwrap_or(DEFAULT_PORT)),
                "identityfile" => host.identity_file = Some(expand_home(&value, home)),
                _ => {}
            }
        }
    }

    flush(pending, &mut hosts);
    hosts
}
