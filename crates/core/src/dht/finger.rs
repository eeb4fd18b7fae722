#![warn(missing_docs)]

//! Finger table of the Chord ring.
//!
//! `finger[k]` points at the successor of `(self.id + 2^k) mod 2^160`, so
//! entries sit at exponentially increasing clockwise distances. Slot 0 is
//! the immediate successor. Entries are `None` only before the node has
//! joined a ring.

use serde::Deserialize;
use serde::Serialize;

use crate::dht::did::between;
use crate::dht::Did;
use crate::dht::PeerInfo;

/// Per-node routing shortcuts at exponentially increasing distances.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FingerTable {
    did: Did,
    size: usize,
    finger: Vec<Option<PeerInfo>>,
    fix_finger_index: usize,
}

impl FingerTable {
    /// builder
    pub fn new(did: Did, size: usize) -> Self {
        Self {
            did,
            size,
            finger: vec![None; size],
            fix_finger_index: 0,
        }
    }

    /// Number of slots, fixed at construction.
    pub fn size(&self) -> usize {
        self.size
    }

    /// getter
    pub fn get(&self, index: usize) -> Option<PeerInfo> {
        if index >= self.finger.len() {
            return None;
        }
        self.finger[index].clone()
    }

    /// setter
    pub fn set(&mut self, index: usize, peer: PeerInfo) {
        tracing::debug!("set finger table index: {} peer: {}", index, peer);
        if index >= self.finger.len() {
            tracing::warn!("set finger index out of range, index: {}", index);
            return;
        }
        self.finger[index] = Some(peer);
    }

    /// Point every slot at `peer`. A node forming a singleton ring is its
    /// own successor at every distance.
    pub fn fill(&mut self, peer: PeerInfo) {
        self.finger = vec![Some(peer); self.size];
    }

    /// The immediate successor, slot 0.
    pub fn first(&self) -> Option<PeerInfo> {
        self.get(0)
    }

    /// Distinct entries whose id lies in `(self, id)`, scanning from the
    /// most distant slot down. This is the probe order for
    /// `closest_preceding_finger`: runs of equal entries collapse so a dead
    /// node is probed once, not once per slot.
    pub fn preceding_candidates(&self, id: Did) -> Vec<PeerInfo> {
        let mut seen: Vec<Did> = vec![];
        let mut ret = vec![];
        for entry in self.finger.iter().rev().flatten() {
            if !between(entry.did, self.did, id) {
                continue;
            }
            if seen.contains(&entry.did) {
                continue;
            }
            seen.push(entry.did);
            ret.push(entry.clone());
        }
        ret
    }

    /// All distinct entries from the most distant slot down, regardless of
    /// position. Stabilization falls back to this scan when the successor
    /// list runs dry.
    pub fn distinct_desc(&self) -> Vec<PeerInfo> {
        let mut seen: Vec<Did> = vec![];
        let mut ret = vec![];
        for entry in self.finger.iter().rev().flatten() {
            if seen.contains(&entry.did) {
                continue;
            }
            seen.push(entry.did);
            ret.push(entry.clone());
        }
        ret
    }

    /// Advance the fix-fingers cursor, wrapping at the table size, and
    /// return the slot to refresh this tick.
    pub fn advance_fix_cursor(&mut self) -> usize {
        self.fix_finger_index = (self.fix_finger_index + 1) % self.size;
        self.fix_finger_index
    }

    /// get length of finger
    pub fn len(&self) -> usize {
        self.finger.iter().flatten().count()
    }

    /// is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// get finger list
    pub fn list(&self) -> &Vec<Option<PeerInfo>> {
        &self.finger
    }
}
