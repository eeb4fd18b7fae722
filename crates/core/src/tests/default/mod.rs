//! Multi-node tests driven by an in-memory transport.

use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::RwLock;

use async_trait::async_trait;
use num_bigint::BigUint;

use crate::dht::Chord;
use crate::dht::Did;
use crate::dht::PeerInfo;
use crate::dht::Ring;
use crate::dht::RingBuilder;
use crate::dht::Stabilizer;
use crate::error::Error;
use crate::error::Result;
use crate::transport::NodeClient;

mod test_lookup;
mod test_stabilization;

/// An in-memory network: a registry of rings addressed by uri, with a
/// kill switch to simulate silent crashes. Every call against a killed or
/// unknown uri fails with `Unreachable`, exactly like a real transport
/// timing out.
pub struct MockNet {
    peers: RwLock<HashMap<String, Arc<Ring>>>,
    down: RwLock<HashSet<String>>,
}

impl MockNet {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            peers: RwLock::new(HashMap::new()),
            down: RwLock::new(HashSet::new()),
        })
    }

    pub fn register(&self, ring: Arc<Ring>) {
        self.peers
            .write()
            .unwrap()
            .insert(ring.info.uri.clone(), ring);
    }

    /// Silently crash the node at `uri`.
    pub fn kill(&self, uri: &str) {
        self.down.write().unwrap().insert(uri.to_string());
    }

    fn target(&self, uri: &str) -> Result<Arc<Ring>> {
        if self.down.read().unwrap().contains(uri) {
            return Err(Error::Unreachable);
        }
        self.peers
            .read()
            .unwrap()
            .get(uri)
            .cloned()
            .ok_or(Error::Unreachable)
    }
}

#[async_trait]
impl NodeClient for MockNet {
    async fn node_id(&self, uri: &str) -> Result<Did> {
        Ok(self.target(uri)?.info.did)
    }

    async fn is_active(&self, uri: &str) -> Result<bool> {
        Ok(self.target(uri)?.is_active())
    }

    async fn info(&self, uri: &str) -> Result<PeerInfo> {
        Ok(self.target(uri)?.info.clone())
    }

    async fn successor(&self, uri: &str) -> Result<PeerInfo> {
        self.target(uri)?.successor()
    }

    async fn predecessor(&self, uri: &str) -> Result<Option<PeerInfo>> {
        Ok(self.target(uri)?.lock_predecessor()?.clone())
    }

    async fn successor_list(&self, uri: &str) -> Result<Vec<PeerInfo>> {
        Ok(self.target(uri)?.lock_successors()?.list())
    }

    async fn find_successor(&self, uri: &str, id: Did) -> Result<PeerInfo> {
        self.target(uri)?.find_successor(id).await
    }

    async fn find_predecessor(&self, uri: &str, id: Did) -> Result<PeerInfo> {
        self.target(uri)?.find_predecessor(id).await
    }

    async fn closest_preceding_finger(&self, uri: &str, id: Did) -> Result<PeerInfo> {
        self.target(uri)?.closest_preceding_finger(id).await
    }

    async fn notify(&self, uri: &str, candidate: PeerInfo) -> Result<()> {
        self.target(uri)?.notify(candidate)?;
        Ok(())
    }

    async fn notify_predecessor_leaving(
        &self,
        uri: &str,
        node: PeerInfo,
        new_predecessor: Option<PeerInfo>,
    ) -> Result<()> {
        self.target(uri)?
            .notify_predecessor_leaving(node, new_predecessor)
    }

    async fn notify_successor_leaving(
        &self,
        uri: &str,
        node: PeerInfo,
        successors: Vec<PeerInfo>,
    ) -> Result<()> {
        self.target(uri)?.notify_successor_leaving(node, successors)
    }

    async fn successor_candidates(&self, uri: &str, id: Did, max: usize) -> Result<Vec<PeerInfo>> {
        self.target(uri)?.successor_candidates(id, max).await
    }
}

/// Build and register a ring at an explicit position.
pub fn prepare_node(net: &Arc<MockNet>, did: Did) -> Arc<Ring> {
    let port = 4510;
    let info = PeerInfo::with_did(did, port);
    let ring = Arc::new(
        RingBuilder::new(info, net.clone() as Arc<dyn NodeClient>)
            .succ_max(3)
            .build(),
    );
    net.register(ring.clone());
    ring
}

/// One maintenance round is a cycle on every node, in registration order.
pub async fn run_rounds(stabilizers: &[Stabilizer], rounds: usize) {
    for _ in 0..rounds {
        for stab in stabilizers {
            let _ = stab.run_cycle().await;
        }
    }
}

pub fn stabilizer(ring: &Arc<Ring>) -> Stabilizer {
    Stabilizer::new(ring.clone(), std::time::Duration::from_millis(10))
}

/// Evenly spaced ring positions: `k * 2^157` for k in 0..n (n <= 8).
pub fn spread_dids(n: usize) -> Vec<Did> {
    (0..n)
        .map(|k| Did::from(BigUint::from(k as u32) << 157))
        .collect()
}

/// The node owning `id`: the first did clockwise at or after it.
pub fn expected_owner(dids: &[Did], id: Did) -> Did {
    let mut sorted = dids.to_vec();
    sorted.sort();
    sorted
        .iter()
        .find(|did| **did >= id)
        .copied()
        .unwrap_or(sorted[0])
}
