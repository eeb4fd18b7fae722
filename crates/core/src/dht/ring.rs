//! Chord routing state machine of a single node.
#![warn(missing_docs)]

use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use async_trait::async_trait;

use super::did::between;
use super::did::between_incl_end;
use super::did::between_incl_start;
use super::did::finger_start;
use super::successor::SuccessorList;
use super::types::Chord;
use super::types::NoopCallback;
use super::types::RingCallback;
use super::FingerTable;
use crate::consts::HASH_BIT;
use crate::consts::SLIST_SIZE;
use crate::dht::Did;
use crate::dht::PeerInfo;
use crate::error::Error;
use crate::error::Result;
use crate::transport::NodeClient;

/// Ring holds the routing state a node owns: its finger table, successor
/// list and predecessor pointer, plus the lookup engine over them. All
/// nodes of a network form a clockwise ring in the order of [Did]; this
/// struct takes its name from that.
///
/// Mutations are serialized behind short-lived sync locks; remote calls are
/// never made while a lock is held. Lookups snapshot what they need,
/// release, then hop.
#[derive(Clone)]
pub struct Ring {
    /// Descriptor of the local node. Set at construction, never mutated.
    pub info: PeerInfo,
    /// [FingerTable] help node to find successor quickly.
    pub finger: Arc<Mutex<FingerTable>>,
    /// The next nodes on the ring. Multiple entries for fault tolerance;
    /// the head should be same as the first element in finger table.
    pub successors: Arc<Mutex<SuccessorList>>,
    /// The previous node on the ring.
    pub predecessor: Arc<Mutex<Option<PeerInfo>>>,
    active: Arc<AtomicBool>,
    in_ring: Arc<AtomicBool>,
    client: Arc<dyn NodeClient>,
    callback: Arc<dyn RingCallback>,
}

/// Builder of [Ring].
pub struct RingBuilder {
    info: PeerInfo,
    client: Arc<dyn NodeClient>,
    succ_max: usize,
    callback: Arc<dyn RingCallback>,
}

impl RingBuilder {
    /// Start a builder for the node described by `info`, talking to peers
    /// through `client`.
    pub fn new(info: PeerInfo, client: Arc<dyn NodeClient>) -> Self {
        Self {
            info,
            client,
            succ_max: SLIST_SIZE,
            callback: Arc::new(NoopCallback),
        }
    }

    /// Override the successor list capacity.
    pub fn succ_max(mut self, max: usize) -> Self {
        self.succ_max = max;
        self
    }

    /// Attach a membership observer.
    pub fn callback(mut self, callback: Arc<dyn RingCallback>) -> Self {
        self.callback = callback;
        self
    }

    /// Build the ring. The node starts inactive; [Chord::join] activates it.
    pub fn build(self) -> Ring {
        Ring {
            finger: Arc::new(Mutex::new(FingerTable::new(self.info.did, HASH_BIT))),
            successors: Arc::new(Mutex::new(SuccessorList::new(self.succ_max))),
            predecessor: Arc::new(Mutex::new(None)),
            active: Arc::new(AtomicBool::new(false)),
            in_ring: Arc::new(AtomicBool::new(false)),
            client: self.client,
            callback: self.callback,
            info: self.info,
        }
    }
}

impl Ring {
    /// Lock and return MutexGuard of the finger table.
    pub fn lock_finger(&self) -> Result<MutexGuard<FingerTable>> {
        self.finger.lock().map_err(|_| Error::StateLockPoisoned)
    }

    /// Lock and return MutexGuard of the successor list.
    pub fn lock_successors(&self) -> Result<MutexGuard<SuccessorList>> {
        self.successors.lock().map_err(|_| Error::StateLockPoisoned)
    }

    /// Lock and return MutexGuard of the predecessor.
    pub fn lock_predecessor(&self) -> Result<MutexGuard<Option<PeerInfo>>> {
        self.predecessor
            .lock()
            .map_err(|_| Error::StateLockPoisoned)
    }

    /// The immediate successor: head of the successor list, falling back to
    /// finger slot 0.
    pub fn successor(&self) -> Result<PeerInfo> {
        if let Some(peer) = self.lock_successors()?.head() {
            return Ok(peer);
        }
        self.lock_finger()?.first().ok_or(Error::MissingSuccessor)
    }

    /// Point both finger slot 0 and the successor list head at `peer`.
    pub(crate) fn set_successor(&self, peer: PeerInfo) -> Result<()> {
        tracing::debug!("{} adopting successor {}", self.info, peer);
        self.lock_finger()?.set(0, peer.clone());
        self.lock_successors()?.set_head(peer);
        Ok(())
    }

    /// True between a completed join and leave.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// True once some peer has acknowledged this node as its predecessor.
    pub fn is_in_ring(&self) -> bool {
        self.in_ring.load(Ordering::SeqCst)
    }

    /// Drop out of the ring without notices. Stabilization calls this when
    /// every known peer is dead.
    pub(crate) fn deactivate(&self) {
        self.active.store(false, Ordering::SeqCst);
        self.in_ring.store(false, Ordering::SeqCst);
    }

    pub(crate) fn client(&self) -> &Arc<dyn NodeClient> {
        &self.client
    }

    /// Liveness of a peer, with local bypass: the node itself is always
    /// alive.
    pub(crate) async fn probe(&self, peer: &PeerInfo) -> bool {
        if peer.did == self.info.did {
            return true;
        }
        self.client.alive(&peer.uri).await
    }

    /// A peer's successor, dispatched locally when the peer is this node.
    pub(crate) async fn peer_successor(&self, peer: &PeerInfo) -> Result<PeerInfo> {
        if peer.did == self.info.did {
            return self.successor();
        }
        self.client.successor(&peer.uri).await
    }

    /// A peer's successor list, dispatched locally when the peer is this
    /// node.
    pub(crate) async fn peer_successor_list(&self, peer: &PeerInfo) -> Result<Vec<PeerInfo>> {
        if peer.did == self.info.did {
            return Ok(self.lock_successors()?.list());
        }
        self.client.successor_list(&peer.uri).await
    }

    fn mark_joined(&self) {
        if !self.in_ring.swap(true, Ordering::SeqCst) {
            tracing::info!("{} acknowledged as a predecessor, now in ring", self.info);
            self.callback.on_joined(&self.info);
        }
    }

    async fn build_finger_table(&self, bootstrap: &str) -> Result<()> {
        let size = self.lock_finger()?.size();
        for k in 0..size - 1 {
            let prev = self.lock_finger()?.get(k).ok_or(Error::MissingSuccessor)?;
            let start = finger_start(self.info.did, k + 1);
            // When the next interval starts before the previous finger,
            // that finger owns it too; only otherwise ask the bootstrap.
            if between_incl_start(start, self.info.did, prev.did) {
                self.lock_finger()?.set(k + 1, prev);
            } else {
                let peer = self.client.find_successor(bootstrap, start).await?;
                self.lock_finger()?.set(k + 1, peer);
            }
        }
        Ok(())
    }

    async fn build_successor_list(&self) -> Result<()> {
        let head = self.successor()?;
        let max = {
            let mut successors = self.lock_successors()?;
            successors.replace(vec![head.clone()]);
            successors.max()
        };
        let mut last = head;
        while self.lock_successors()?.len() < max {
            match self.peer_successor(&last).await {
                Ok(next) => {
                    self.lock_successors()?.push(next.clone());
                    last = next;
                }
                Err(e) => {
                    // Stabilization completes the list later.
                    tracing::debug!("abandoning successor list build: {}", e);
                    break;
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Chord for Ring {
    async fn join(&self, bootstrap: Option<&str>) -> Result<()> {
        match bootstrap {
            None => {
                tracing::info!("{} forming a singleton ring", self.info);
                *self.lock_predecessor()? = None;
                self.lock_finger()?.fill(self.info.clone());
                self.lock_successors()?.fill(self.info.clone());
            }
            Some(uri) => {
                tracing::info!("{} joining ring via {}", self.info, uri);
                *self.lock_predecessor()? = None;
                let succ = match self.client.find_successor(uri, self.info.did).await {
                    Ok(succ) => succ,
                    Err(Error::Unreachable) => {
                        return Err(Error::BootstrapFailed(uri.to_string()))
                    }
                    Err(e) => return Err(e),
                };
                tracing::info!("{} learned successor {}", self.info, succ);
                self.lock_finger()?.set(0, succ);
                self.build_finger_table(uri).await?;
                self.build_successor_list().await?;
            }
        }
        self.active.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn leave(&self) -> Result<()> {
        tracing::info!("{} leaving the ring", self.info);
        // Flipping active stops the maintenance loop; a tick in flight
        // completes, none starts after this.
        self.active.store(false, Ordering::SeqCst);

        let successor = self.successor().ok();
        let predecessor = self.lock_predecessor()?.clone();

        if let Some(succ) = successor {
            if predecessor.as_ref() != Some(&succ) {
                if succ.did != self.info.did {
                    if let Err(e) = self
                        .client
                        .notify_predecessor_leaving(
                            &succ.uri,
                            self.info.clone(),
                            predecessor.clone(),
                        )
                        .await
                    {
                        tracing::warn!("departure notice to successor failed: {}", e);
                    }
                }
                if let Some(pred) = &predecessor {
                    if pred.did != self.info.did {
                        let successors = self.lock_successors()?.list();
                        if let Err(e) = self
                            .client
                            .notify_successor_leaving(&pred.uri, self.info.clone(), successors)
                            .await
                        {
                            tracing::warn!("departure notice to predecessor failed: {}", e);
                        }
                    }
                }
            }
        }

        self.in_ring.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn find_successor(&self, id: Did) -> Result<PeerInfo> {
        let succ = self.successor()?;
        if between_incl_end(id, self.info.did, succ.did) {
            tracing::debug!("find_successor: {} owns {}", succ, id);
            return Ok(succ);
        }
        let hop = self.closest_preceding_finger(id).await?;
        if hop.did == self.info.did {
            // No usable finger; the successor is the best answer we have.
            return Ok(succ);
        }
        tracing::debug!("find_successor: {} delegating {} to {}", self.info, id, hop);
        self.client.find_successor(&hop.uri, id).await
    }

    async fn find_predecessor(&self, id: Did) -> Result<PeerInfo> {
        if id == self.info.did {
            return self
                .lock_predecessor()?
                .clone()
                .ok_or(Error::MissingPredecessor);
        }
        let mut node = self.info.clone();
        let mut succ = self.successor()?;
        let mut hops = 0;
        while !between_incl_end(id, node.did, succ.did) {
            node = if node.did == self.info.did {
                self.closest_preceding_finger(id).await?
            } else {
                self.client.closest_preceding_finger(&node.uri, id).await?
            };
            succ = self.peer_successor(&node).await?;
            // A peer that fails to advance the walk would loop it forever.
            hops += 1;
            if hops > HASH_BIT {
                return Err(Error::Unreachable);
            }
        }
        Ok(node)
    }

    async fn closest_preceding_finger(&self, id: Did) -> Result<PeerInfo> {
        let candidates = self.lock_finger()?.preceding_candidates(id);
        for peer in candidates {
            if self.probe(&peer).await {
                return Ok(peer);
            }
            tracing::debug!("skipping dead finger {}", peer);
        }
        Ok(self.info.clone())
    }

    async fn successor_candidates(&self, id: Did, max: usize) -> Result<Vec<PeerInfo>> {
        let mut list = match self.find_successor(id).await {
            Ok(owner) => match self.peer_successor_list(&owner).await {
                Ok(successors) => {
                    let mut list = vec![owner];
                    list.extend(successors);
                    list
                }
                Err(e) => {
                    tracing::debug!("owner of {} unreachable, walking back: {}", id, e);
                    let pred = self.find_predecessor(id).await?;
                    self.peer_successor_list(&pred).await?
                }
            },
            Err(e) => {
                tracing::debug!("find_successor({}) failed, walking back: {}", id, e);
                let pred = self.find_predecessor(id).await?;
                self.peer_successor_list(&pred).await?
            }
        };
        while list.len() < max {
            let Some(last) = list.last().cloned() else {
                break;
            };
            match self.peer_successor(&last).await {
                Ok(next) => list.push(next),
                Err(_) => break,
            }
        }
        list.truncate(max);
        Ok(list)
    }

    fn notify(&self, candidate: PeerInfo) -> Result<Option<Did>> {
        let adopted = {
            let mut predecessor = self.lock_predecessor()?;
            let adopt = match predecessor.as_ref() {
                None => true,
                Some(pred) => between(candidate.did, pred.did, self.info.did),
            };
            if !adopt {
                return Ok(None);
            }
            tracing::debug!("{} adopting predecessor {}", self.info, candidate);
            let did = candidate.did;
            *predecessor = Some(candidate);
            did
        };
        self.mark_joined();
        Ok(Some(adopted))
    }

    fn notify_predecessor_leaving(
        &self,
        node: PeerInfo,
        new_predecessor: Option<PeerInfo>,
    ) -> Result<()> {
        let mut predecessor = self.lock_predecessor()?;
        if predecessor.as_ref() != Some(&node) {
            tracing::debug!("ignoring stale departure notice from {}", node);
            return Ok(());
        }
        tracing::info!("predecessor {} left, replacement {:?}", node, new_predecessor);
        *predecessor = new_predecessor;
        Ok(())
    }

    fn notify_successor_leaving(&self, node: PeerInfo, successors: Vec<PeerInfo>) -> Result<()> {
        let Ok(current) = self.successor() else {
            return Ok(());
        };
        if current != node {
            tracing::debug!("ignoring stale departure notice from {}", node);
            return Ok(());
        }
        tracing::info!("successor {} left, rotating successor list", node);
        let new_head = {
            let mut slist = self.lock_successors()?;
            slist.pop_head();
            if let Some(last) = successors.last() {
                slist.push(last.clone());
            }
            slist.head()
        };
        if let Some(head) = new_head {
            self.lock_finger()?.set(0, head);
        }
        Ok(())
    }

    fn is_alone(&self) -> Result<bool> {
        let Some(pred) = self.lock_predecessor()?.clone() else {
            return Ok(false);
        };
        let Ok(succ) = self.successor() else {
            return Ok(false);
        };
        Ok(pred.did == self.info.did && succ.did == self.info.did)
    }
}
