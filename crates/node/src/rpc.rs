//! Wire surface of the node: method names and the request/response bodies
//! shared by the HTTP endpoint and the HTTP client.

use chordal_core::dht::Did;
use chordal_core::dht::PeerInfo;
use serde::Deserialize;
use serde::Serialize;

/// The public operations a node exposes, one route each under `/rpc/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    NodeId,
    IsActive,
    Info,
    Successor,
    Predecessor,
    SuccessorList,
    FindSuccessor,
    FindPredecessor,
    ClosestPrecedingFinger,
    Notify,
    NotifyPredecessorLeaving,
    NotifySuccessorLeaving,
    SuccessorCandidates,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::NodeId => "node_id",
            Method::IsActive => "is_active",
            Method::Info => "info",
            Method::Successor => "successor",
            Method::Predecessor => "predecessor",
            Method::SuccessorList => "successor_list",
            Method::FindSuccessor => "find_successor",
            Method::FindPredecessor => "find_predecessor",
            Method::ClosestPrecedingFinger => "closest_preceding_finger",
            Method::Notify => "notify",
            Method::NotifyPredecessorLeaving => "notify_predecessor_leaving",
            Method::NotifySuccessorLeaving => "notify_successor_leaving",
            Method::SuccessorCandidates => "successor_candidates",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdResponse {
    pub id: Did,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveResponse {
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerResponse {
    pub peer: PeerInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaybePeerResponse {
    pub peer: Option<PeerInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerListResponse {
    pub peers: Vec<PeerInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupRequest {
    pub id: Did,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyRequest {
    pub candidate: PeerInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredecessorLeavingRequest {
    pub node: PeerInfo,
    pub new_predecessor: Option<PeerInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessorLeavingRequest {
    pub node: PeerInfo,
    pub successors: Vec<PeerInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidatesRequest {
    pub id: Did,
    pub max: usize,
}
