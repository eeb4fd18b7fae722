#![warn(missing_docs)]

//! Node descriptors.
//!
//! A [PeerInfo] is the immutable identity-plus-address record a node hands
//! out about itself. Its ring id is derived from `ip:port`, so every node
//! in the network computes the same id for the same endpoint. The `uri`
//! field is opaque to routing; it is whatever the transport needs to reach
//! the node.

use ethereum_types::H160;
use serde::Deserialize;
use serde::Serialize;
use sha1::Digest;
use sha1::Sha1;

use crate::dht::Did;

/// Identity and address of a node on the ring. Equality and hashing go by
/// [Did] only; two descriptors for the same id are the same peer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PeerInfo {
    /// Listening ip of the node.
    pub ip: String,
    /// Listening port of the node.
    pub port: u16,
    /// Ring id, `SHA-1(ip:port)` interpreted as a 160-bit integer.
    pub did: Did,
    /// Transport address of the node. Opaque to routing.
    pub uri: String,
}

impl PeerInfo {
    /// Build a descriptor for `ip:port`, deriving the ring id.
    pub fn new(ip: impl Into<String>, port: u16, uri: impl Into<String>) -> Self {
        let ip = ip.into();
        let did = hash_endpoint(&ip, port);
        Self {
            ip,
            port,
            did,
            uri: uri.into(),
        }
    }

    /// Build a descriptor with an explicit id, skipping the endpoint hash.
    /// Tests use this to place nodes at chosen ring positions.
    #[cfg(test)]
    pub fn with_did(did: Did, port: u16) -> Self {
        Self {
            ip: "127.0.0.1".to_string(),
            port,
            did,
            uri: format!("mock://{did}"),
        }
    }
}

/// Hash an `ip:port` endpoint onto the ring. SHA-1 emits exactly 160 bits,
/// the full width of the id space.
pub fn hash_endpoint(ip: &str, port: u16) -> Did {
    let digest = Sha1::digest(format!("{ip}:{port}").as_bytes());
    Did::from(H160::from_slice(digest.as_slice()))
}

impl PartialEq for PeerInfo {
    fn eq(&self, rhs: &Self) -> bool {
        self.did == rhs.did
    }
}

impl Eq for PeerInfo {}

impl std::hash::Hash for PeerInfo {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.did.hash(state)
    }
}

impl std::fmt::Display for PeerInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}@{}:{}", self.did, self.ip, self.port)
    }
}
