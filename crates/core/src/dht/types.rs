#![warn(missing_docs)]

//! Protocol traits of the ring.

use async_trait::async_trait;

use crate::dht::Did;
use crate::dht::PeerInfo;
use crate::error::Result;

/// The Chord protocol surface of a node. Chord is a distributed hash table
/// algorithm that resolves key→owner lookups in O(log n) hops while every
/// node keeps only O(log n) routing state. You may want to browse its
/// [wiki](https://en.wikipedia.org/wiki/Chord_(peer-to-peer)) before you
/// read this.
///
/// The lookup operations may block on remote hops; the notification
/// handlers are local-only and never block. The same surface is what a node
/// exposes to its peers over the transport, so every method here has a
/// counterpart on [crate::transport::NodeClient].
#[async_trait]
pub trait Chord {
    /// Enter the ring. With a bootstrap uri, ask that node for our
    /// successor and build the routing tables; without one, form a
    /// singleton ring.
    async fn join(&self, bootstrap: Option<&str>) -> Result<()>;

    /// Leave the ring gracefully, handing our neighbors what they need to
    /// route around us. Departure notices are best-effort.
    async fn leave(&self) -> Result<()>;

    /// Resolve the node owning `id`: the first live node whose id is equal
    /// to or clockwise-after `id`.
    async fn find_successor(&self, id: Did) -> Result<PeerInfo>;

    /// Resolve the node immediately counterclockwise of `id`.
    async fn find_predecessor(&self, id: Did) -> Result<PeerInfo>;

    /// The most distant finger that precedes `id` and answers a liveness
    /// probe, or our own descriptor when none qualifies.
    async fn closest_preceding_finger(&self, id: Did) -> Result<PeerInfo>;

    /// The first `max` nodes responsible for `id`, owner first. An `Err` is
    /// the failure marker; partial knowledge is returned as-is.
    async fn successor_candidates(&self, id: Did, max: usize) -> Result<Vec<PeerInfo>>;

    /// Handle a peer that believes it is our predecessor. Returns the
    /// adopted id when the claim wins.
    fn notify(&self, candidate: PeerInfo) -> Result<Option<Did>>;

    /// Our predecessor announced departure and named its own predecessor
    /// as replacement. Stale notices are ignored.
    fn notify_predecessor_leaving(
        &self,
        node: PeerInfo,
        new_predecessor: Option<PeerInfo>,
    ) -> Result<()>;

    /// Our successor announced departure and handed over its successor
    /// list. Stale notices are ignored.
    fn notify_successor_leaving(&self, node: PeerInfo, successors: Vec<PeerInfo>) -> Result<()>;

    /// True iff this node is its own predecessor and successor. False while
    /// the predecessor is still unset, even for a genuine singleton; the
    /// first self-notify during stabilization flips it.
    fn is_alone(&self) -> Result<bool>;
}

/// Observer hooks a node fires as its ring membership changes. The storage
/// layer uses [RingCallback::on_joined] to trigger key handoff.
pub trait RingCallback: Send + Sync {
    /// Fired exactly once, when this node is first acknowledged as some
    /// peer's predecessor.
    fn on_joined(&self, _info: &PeerInfo) {}
}

/// Default callback that observes nothing.
pub struct NoopCallback;

impl RingCallback for NoopCallback {}
