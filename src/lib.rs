//! SSH Manager - backend for a desktop SSH management app
//!
//! A GUI shell around standard SSH command-line tooling. The core is the
//! Host Config Store: a round-trip parser and idempotent-merge generator
//! for the OpenSSH client config, which preserves user-authored content
//! while rewriting the managed block. Around it sit thin wrappers over the
//! system `ssh`/`ssh-keygen` binaries for key pairs, known hosts, port
//! forwards, and terminal launch.

pub mod config;
pub mod forwarding;
pub mod keys;
pub mod known_hosts;
pub mod launcher;

pub use config::{HostConfigStore, HostEntry, HostStoreError};
pub use forwarding::{ForwardManager, PortForwardRule};
pub use keys::{KeyType, SshKeyInfo};
pub use known_hosts::{KnownHostEntry, KnownHostsManager};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging. Called once by the embedding shell at startup.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
