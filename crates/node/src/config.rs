//! Node configuration, loadable from a YAML file and overridable from the
//! command line.

use std::net::SocketAddr;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

use crate::error::Error;
use crate::error::Result;

pub const DEFAULT_BIND_IP: &str = "127.0.0.1";
pub const DEFAULT_BIND_PORT: u16 = 4510;
pub const DEFAULT_RPC_TIMEOUT_MS: u64 = 2000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Listening ip. Also hashed into the node's ring id.
    #[serde(default = "default_ip")]
    pub ip: String,
    /// Listening port. Also hashed into the node's ring id.
    #[serde(default = "default_port")]
    pub port: u16,
    /// `ip:port` of a live ring member to join through. Absent means
    /// "form a new ring".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bootstrap: Option<String>,
    /// Successor list length.
    #[serde(default = "default_slist_size")]
    pub slist_size: usize,
    /// Maintenance tick period in seconds.
    #[serde(default = "default_stabilize_interval")]
    pub stabilize_interval: u64,
    /// Per-request transport timeout in milliseconds. A peer that misses
    /// it counts as unreachable.
    #[serde(default = "default_rpc_timeout_ms")]
    pub rpc_timeout_ms: u64,
}

fn default_ip() -> String {
    DEFAULT_BIND_IP.to_string()
}

fn default_port() -> u16 {
    DEFAULT_BIND_PORT
}

fn default_slist_size() -> usize {
    chordal_core::consts::SLIST_SIZE
}

fn default_stabilize_interval() -> u64 {
    chordal_core::consts::STABILIZE_INTERVAL
}

fn default_rpc_timeout_ms() -> u64 {
    DEFAULT_RPC_TIMEOUT_MS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ip: default_ip(),
            port: default_port(),
            bootstrap: None,
            slist_size: default_slist_size(),
            stabilize_interval: default_stabilize_interval(),
            rpc_timeout_ms: default_rpc_timeout_ms(),
        }
    }
}

impl Config {
    /// Load a config from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&raw)?)
    }

    /// Write a default config to `path` as a YAML template the operator
    /// can edit.
    pub fn write_template<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Self::default();
        let raw = serde_yaml::to_string(&config)?;
        std::fs::write(path, raw)?;
        Ok(config)
    }

    /// The uri peers use to reach this node.
    pub fn uri(&self) -> String {
        format!("http://{}:{}", self.ip, self.port)
    }

    /// The socket address to bind the endpoint on.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.ip, self.port)
            .parse()
            .map_err(|_| Error::InvalidBindAddress(self.ip.clone(), self.port))
    }
}
