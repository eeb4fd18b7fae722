//! Error of chordal-core

/// A wrap `Result` contains custom errors.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors collections in chordal-core.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A remote peer did not answer within the transport's timeout.
    /// Callers treat this as a liveness negative.
    #[error("Remote peer unreachable")]
    Unreachable,

    /// Stabilization exhausted every known peer. The node has left the
    /// ring and flipped inactive; rejoin is up to the operator.
    #[error("All routing pointers are dead, node is isolated")]
    Isolated,

    /// The bootstrap node could not be contacted during join.
    #[error("Failed to contact bootstrap node: {0}")]
    BootstrapFailed(String),

    /// A remote call failed at the application level. The peer answered,
    /// so this is not a liveness negative.
    #[error("Remote call failed: {0}")]
    Rpc(String),

    /// Routing state holds no successor yet.
    #[error("No successor is known")]
    MissingSuccessor,

    /// Routing state holds no predecessor.
    #[error("No predecessor is known")]
    MissingPredecessor,

    /// A sync lock on routing state was poisoned.
    #[error("Failed to lock ring state")]
    StateLockPoisoned,

    /// Invalid hexadecimal ring id.
    #[error("Invalid hexadecimal id: {0}")]
    BadHexId(String),
}
