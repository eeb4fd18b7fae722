#![warn(missing_docs)]

//! Successor list of the ring.
//!
//! An ordered cache of the next R nodes clockwise, used as failover when the
//! immediate successor dies. The head is always the immediate successor;
//! whenever both are defined it equals finger slot 0.

use serde::Deserialize;
use serde::Serialize;

use crate::dht::PeerInfo;

/// Ordered sequence of the next `max` successors on the ring.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SuccessorList {
    max: usize,
    peers: Vec<PeerInfo>,
}

impl SuccessorList {
    /// builder
    pub fn new(max: usize) -> Self {
        Self { max, peers: vec![] }
    }

    /// Capacity of the list.
    pub fn max(&self) -> usize {
        self.max
    }

    /// is empty
    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// Current length.
    pub fn len(&self) -> usize {
        self.peers.len()
    }

    /// The immediate successor.
    pub fn head(&self) -> Option<PeerInfo> {
        self.peers.first().cloned()
    }

    /// Snapshot of the whole list.
    pub fn list(&self) -> Vec<PeerInfo> {
        self.peers.clone()
    }

    /// Point every slot at `peer`. Used when forming a singleton ring.
    pub fn fill(&mut self, peer: PeerInfo) {
        self.peers = vec![peer; self.max];
    }

    /// Append a successor, dropping anything beyond capacity.
    pub fn push(&mut self, peer: PeerInfo) {
        self.peers.push(peer);
        self.peers.truncate(self.max);
    }

    /// Drop the head. Called when the immediate successor is dead or has
    /// announced departure.
    pub fn pop_head(&mut self) -> Option<PeerInfo> {
        if self.peers.is_empty() {
            return None;
        }
        Some(self.peers.remove(0))
    }

    /// Replace the whole list, truncating to capacity.
    pub fn replace(&mut self, peers: Vec<PeerInfo>) {
        self.peers = peers;
        self.peers.truncate(self.max);
    }

    /// Make `peer` the head. A no-op when it already is; otherwise it is
    /// prepended and the tail trimmed to capacity.
    pub fn set_head(&mut self, peer: PeerInfo) {
        if self.head().as_ref() == Some(&peer) {
            return;
        }
        self.peers.insert(0, peer);
        self.peers.truncate(self.max);
    }
}
