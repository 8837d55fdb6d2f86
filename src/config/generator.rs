//! SSH client config generator
//!
//! Merges a desired host set into an existing config file body. The block
//! below the managed-section banner is fully owned by this tool and is
//! regenerated on every save; any unmanaged stanza whose `Host` name
//! collides with a desired host is removed; everything else is preserved
//! byte-for-byte.

use std::path::Path;

use super::paths::collapse_home;
use super::types::{HostEntry, DEFAULT_PORT};

/// First banner line of the managed section
pub const MANAGED_BANNER: &str = "# SSH Manager - Managed Hosts";
/// Second banner line of the managed section
pub const MANAGED_WARNING: &str = "# Do not edit this section manually";

/// Attribute keys recognized as belonging to a host stanza when dropping a
/// colliding unmanaged block
const STANZA_KEYS: [&str; 4] = ["hostname", "user", "port", "identityfile"];

/// Classification of one existing-content line.
///
/// The scan below maps each kind to exactly one action, which makes the
/// precedence of the overlapping conditions an explicit contract instead of
/// incidental check order.
#[derive(Debug, PartialEq, Eq)]
enum LineKind<'a> {
    /// Sentinel comment opening the tool-owned block
    ManagedMarker,
    /// A `Host <name>` line starting a stanza
    HostLine { name: &'a str },
    /// Any other non-blank, non-indented line (starts a top-level section)
    TopLevel,
    /// A known stanza attribute line (`HostName`, `User`, `Port`,
    /// `IdentityFile`)
    Attribute,
    /// Anything else: blank lines, indented comments, unknown attributes
    Other,
}

fn classify(line: &str) -> LineKind<'_> {
    let folded = line.trim().to_lowercase();

    if folded.contains("ssh manager") && folded.contains("managed hosts") {
        return LineKind::ManagedMarker;
    }
    if line.len() >= 5 && line.as_bytes()[..5].eq_ignore_ascii_case(b"host ") {
        return LineKind::HostLine {
            name: line[5..].trim(),
        };
    }
    if !line.is_empty() && !line.starts_with(' ') && !line.starts_with('\t') {
        return LineKind::TopLevel;
    }
    if STANZA_KEYS.iter().any(|key| folded.starts_with(key)) {
        return LineKind::Attribute;
    }
    LineKind::Other
}

/// Produce a full replacement config file body.
///
/// `existing` is the current on-disk content (empty string if the file does
/// not exist); `home` is the directory collapsed back to `~` in
/// `IdentityFile` values. Pure function: no I/O, byte-identical output for
/// identical inputs.
pub fn generate_config(hosts: &[HostEntry], existing: &str, home: &Path) -> String {
    let mut preserved: Vec<&str> = Vec::new();
    let mut in_managed = false;
    let mut skip_host = false;

    for line in existing.lines() {
        // Once the marker is seen everything to end of file is discarded
        if in_managed {
            continue;
        }
        match classify(line) {
            LineKind::ManagedMarker => in_managed = true,
            LineKind::HostLine { name } => {
                skip_host = hosts.iter().any(|h| h.name == name);
                if !skip_host {
                    preserved.push(line);
                }
            }
            LineKind::TopLevel => {
                skip_host = false;
                preserved.push(line);
            }
            LineKind::Attribute => {
                if !skip_host {
                    preserved.push(line);
                }
            }
            LineKind::Other => preserved.push(line),
        }
    }

    while preserved
        .last()
        .is_some_and(|line| line.trim().is_empty())
    {
        preserved.pop();
    }

    let mut out = String::new();
    for line in &preserved {
        out.push_str(line);
        out.push('\n');
    }

    if hosts.is_empty() {
        return out;
    }

    if !preserved.is_empty() {
        out.push('\n');
    }
    out.push_str(MANAGED_BANNER);
    out.push('\n');
    out.push_str(MANAGED_WARNING);
    out.push_str("\n\n");

    for host in hosts {
        out.push_str(&format!("Host {}\n", host.name));
        out.push_str(&format!("    HostName {}\n", host.hostname));
        out.push_str(&format!("    User {}\n", host.user));
        if host.port != DEFAULT_PORT {
            out.push_str(&format!("    Port {}\n", host.port));
        }
        if let Some(ref identity_file) = host.identity_file {
            out.push_str(&format!(
                "    IdentityFile {}\n",
                collapse_home(identity_file, home)
            ));
        }
        out.push('\n');
    }

    out
}
