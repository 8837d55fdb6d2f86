//! Host Config Store
//!
//! Round-trip reader/writer for the OpenSSH client config file. The store
//! owns one managed block (marked by a banner comment) and regenerates it
//! on every save while leaving user-authored content untouched.

pub mod generator;
pub mod parser;
pub mod paths;
pub mod store;
pub mod types;

pub use generator::{generate_config, MANAGED_BANNER, MANAGED_WARNING};
pub use parser::parse_config;
pub use paths::{collapse_home, default_config_path, expand_home, known_hosts_path, ssh_dir};
pub use store::{HostConfigStore, HostStoreError};
pub use types::{HostEntry, DEFAULT_PORT, DEFAULT_USER};
