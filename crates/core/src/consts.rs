//! Constant variables.

/// Bit width of the id space. A ring id is an integer in `[0, 2^HASH_BIT)`,
/// and every node keeps one finger per bit.
pub const HASH_BIT: usize = 160;

/// Default length of the successor list. Bounds how many simultaneous
/// successor failures a node survives without external repair.
pub const SLIST_SIZE: usize = 4;

/// Default stabilization tick period in seconds.
pub const STABILIZE_INTERVAL: u64 = 1;
