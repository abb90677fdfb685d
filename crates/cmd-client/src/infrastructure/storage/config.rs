//! TOML-based configuration for the command client.
//!
//! Example file:
//!
//! ```toml
//! [client]
//! network_name = "office-lan"
//!
//! [server]
//! address = "10.0.0.5"
//! port = 8000
//! connect_timeout_ms = 5000
//! nodelay = true
//! ```
//!
//! Every field has a serde default, so an absent file, an empty file, or a
//! file written by an older version all load into a usable config.

use std::net::{SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// `server.address` / `server.port` do not resolve to a socket address.
    #[error("cannot resolve server address {address}:{port}")]
    UnresolvedAddress { address: String, port: u16 },
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level client configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    #[serde(default)]
    pub client: ClientSection,
    #[serde(default)]
    pub server: ServerSection,
}

/// Identity of this client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientSection {
    /// Human-readable name for diagnostics; never sent on the wire.
    #[serde(default = "default_network_name")]
    pub network_name: String,
}

/// Where and how to connect.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerSection {
    /// Host name or IP address of the command server.
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Connect timeout in milliseconds; `0` blocks until the OS gives up.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Sets `TCP_NODELAY` so each flushed segment leaves immediately.
    #[serde(default = "default_true")]
    pub nodelay: bool,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_network_name() -> String {
    "cmd-client".to_string()
}
fn default_address() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    8000
}
fn default_connect_timeout_ms() -> u64 {
    5000
}
fn default_true() -> bool {
    true
}

impl Default for ClientSection {
    fn default() -> Self {
        Self {
            network_name: default_network_name(),
        }
    }
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
            connect_timeout_ms: default_connect_timeout_ms(),
            nodelay: default_true(),
        }
    }
}

impl ClientConfig {
    /// Resolves `server.address:server.port`, taking the first result.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnresolvedAddress`] if resolution fails or
    /// yields nothing.
    pub fn server_socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let unresolved = || ConfigError::UnresolvedAddress {
            address: self.server.address.clone(),
            port: self.server.port,
        };
        (self.server.address.as_str(), self.server.port)
            .to_socket_addrs()
            .map_err(|_| unresolved())?
            .next()
            .ok_or_else(unresolved)
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Loads a [`ClientConfig`] from `path`, returning the defaults if the file
/// does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: &Path) -> Result<ClientConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ClientConfig::default()),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Writes `config` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config(path: &Path, config: &ClientConfig) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
