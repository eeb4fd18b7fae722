#![warn(missing_docs)]

//! Remote invocation adapter.
//!
//! Routing never talks to the network directly; it goes through a
//! [NodeClient], which invokes another node's public operations by uri.
//! Local dispatch (a node calling itself) bypasses the client entirely.
//!
//! Implementations MUST map connect failures and timeouts to
//! [Error::Unreachable](crate::error::Error::Unreachable) and keep
//! application-level failures distinct; the routing layer reads
//! `Unreachable` as "this peer is dead until proven otherwise".

use async_trait::async_trait;

use crate::dht::Did;
use crate::dht::PeerInfo;
use crate::error::Result;

/// One method per operation of the ring's public RPC surface, each
/// addressed by the target node's uri.
#[async_trait]
pub trait NodeClient: Send + Sync {
    /// Ring id of the node at `uri`.
    async fn node_id(&self, uri: &str) -> Result<Did>;

    /// Whether the node at `uri` is an active ring member.
    async fn is_active(&self, uri: &str) -> Result<bool>;

    /// Descriptor of the node at `uri`.
    async fn info(&self, uri: &str) -> Result<PeerInfo>;

    /// Immediate successor of the node at `uri`.
    async fn successor(&self, uri: &str) -> Result<PeerInfo>;

    /// Predecessor of the node at `uri`, if it has one.
    async fn predecessor(&self, uri: &str) -> Result<Option<PeerInfo>>;

    /// Successor list of the node at `uri`.
    async fn successor_list(&self, uri: &str) -> Result<Vec<PeerInfo>>;

    /// Ask the node at `uri` to resolve the owner of `id`.
    async fn find_successor(&self, uri: &str, id: Did) -> Result<PeerInfo>;

    /// Ask the node at `uri` to resolve the node preceding `id`.
    async fn find_predecessor(&self, uri: &str, id: Did) -> Result<PeerInfo>;

    /// Ask the node at `uri` for its closest live finger preceding `id`.
    async fn closest_preceding_finger(&self, uri: &str, id: Did) -> Result<PeerInfo>;

    /// Tell the node at `uri` that `candidate` believes it is its
    /// predecessor.
    async fn notify(&self, uri: &str, candidate: PeerInfo) -> Result<()>;

    /// Tell the node at `uri` that its predecessor `node` is leaving and
    /// hands over `new_predecessor`.
    async fn notify_predecessor_leaving(
        &self,
        uri: &str,
        node: PeerInfo,
        new_predecessor: Option<PeerInfo>,
    ) -> Result<()>;

    /// Tell the node at `uri` that its successor `node` is leaving and
    /// hands over `successors`.
    async fn notify_successor_leaving(
        &self,
        uri: &str,
        node: PeerInfo,
        successors: Vec<PeerInfo>,
    ) -> Result<()>;

    /// Ask the node at `uri` for the `max` nodes responsible for `id`.
    async fn successor_candidates(&self, uri: &str, id: Did, max: usize) -> Result<Vec<PeerInfo>>;

    /// Liveness probe. Best-effort: any transport failure reads as dead,
    /// which at worst costs a detour.
    async fn alive(&self, uri: &str) -> bool {
        matches!(self.is_active(uri).await, Ok(true))
    }
}
