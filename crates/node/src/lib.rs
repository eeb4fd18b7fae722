//! chordal-node: a runnable Chord ring node.
//!
//! Wires [chordal_core]'s routing state machine to the outside world: an
//! HTTP endpoint exposing the ring's public operations, an HTTP
//! [NodeClient](chordal_core::transport::NodeClient) for calling peers,
//! YAML configuration and a command line daemon.

pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod logging;
pub mod rpc;

#[cfg(test)]
mod tests;
