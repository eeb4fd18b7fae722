//! Chordal: a Chord distributed hash table routing core.
//! --------------
//! - [Ring](crate::dht::Ring) keeps the per-node routing state of the
//!   Chord protocol (finger table, successor list, predecessor) and
//!   resolves key→owner lookups in O(log N) expected hops.
//! - [Stabilizer](crate::dht::Stabilizer) runs the periodic maintenance
//!   that repairs the ring under churn: joins, graceful departures and
//!   silent failures.
//! - [NodeClient](crate::transport::NodeClient) is the contract a
//!   transport implements so a node can invoke another node's public
//!   operations by uri. The transport must distinguish "unreachable" from
//!   application-level answers; routing treats unreachable as dead.
//!
//! # Joining
//! A node enters an existing ring by asking any live member for the
//! successor of its own id, then builds its finger table and successor
//! list from there. Without a bootstrap it forms a singleton ring that is
//! its own successor at every distance. A node only counts as a full ring
//! member once a peer has acknowledged it as predecessor; that moment is
//! surfaced through [RingCallback](crate::dht::RingCallback) so a storage
//! layer can start key handoff.
//!
//! # Repair
//! Four periodic tasks run in order each tick: `stabilize` checks the
//! successor and learns newly joined nodes from it, `fix_fingers`
//! refreshes one routing shortcut per tick, `fix_successor_list` pulls
//! failover knowledge forward, and `fix_predecessor` drops a dead
//! predecessor so a live claimant can take the slot. Lookups keep working
//! through churn because every dead pointer is skipped via a liveness
//! probe and repaired by a later tick.

pub mod consts;
pub mod dht;
pub mod error;
pub mod transport;

#[cfg(test)]
mod tests;
