//! Implementation of the Chord routing overlay,
//! ref: <https://pdos.csail.mit.edu/papers/ton:chord/paper-ton.pdf>
//!
//! With high probability, the number of nodes that must be contacted to
//! find a successor in an N-node network is O(log N).

pub mod did;
pub use did::between;
pub use did::between_incl_end;
pub use did::between_incl_start;
pub use did::finger_start;
pub use did::Did;
/// Finger table of a node
pub mod finger;
pub use finger::FingerTable;
/// Node descriptors
pub mod peer;
pub use peer::PeerInfo;
mod ring;
pub use ring::Ring;
pub use ring::RingBuilder;
/// Successor list of a node
pub mod successor;
pub use successor::SuccessorList;
mod stabilization;
pub use stabilization::Stabilizer;
mod types;
pub use types::Chord;
pub use types::NoopCallback;
pub use types::RingCallback;
