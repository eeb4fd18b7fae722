//! End-to-end tests: real rings talking over the HTTP endpoint and client
//! on loopback.

use std::net::SocketAddr;
use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use chordal_core::dht::Chord;
use chordal_core::dht::PeerInfo;
use chordal_core::dht::Ring;
use chordal_core::dht::RingBuilder;
use chordal_core::dht::Stabilizer;

use crate::client::HttpClient;
use crate::endpoint;
use crate::error::Error;

/// Reserve `n` distinct loopback ports.
fn free_ports(n: usize) -> Vec<u16> {
    let listeners: Vec<TcpListener> = (0..n)
        .map(|_| TcpListener::bind("127.0.0.1:0").unwrap())
        .collect();
    listeners
        .iter()
        .map(|l| l.local_addr().unwrap().port())
        .collect()
}

async fn spawn_node(port: u16, bootstrap: Option<&str>) -> Arc<Ring> {
    let info = PeerInfo::new("127.0.0.1", port, format!("http://127.0.0.1:{port}"));
    let client = Arc::new(HttpClient::new(Duration::from_millis(1000)).unwrap());
    let ring = Arc::new(RingBuilder::new(info, client).succ_max(3).build());

    let addr: SocketAddr = ([127, 0, 0, 1], port).into();
    let (_, server) = endpoint::bind(addr, ring.clone()).unwrap();
    tokio::spawn(server);

    ring.join(bootstrap).await.unwrap();
    ring
}

#[tokio::test]
async fn test_two_nodes_form_a_ring_over_http() {
    let ports = free_ports(2);
    let a = spawn_node(ports[0], None).await;
    let b = spawn_node(ports[1], Some(&a.info.uri)).await;

    // the singleton answered b's bootstrap lookup with itself
    assert_eq!(b.successor().unwrap(), a.info);

    let stab_a = Stabilizer::new(a.clone(), Duration::from_millis(50));
    let stab_b = Stabilizer::new(b.clone(), Duration::from_millis(50));
    for _ in 0..3 {
        stab_a.run_cycle().await.unwrap();
        stab_b.run_cycle().await.unwrap();
    }

    assert_eq!(a.successor().unwrap(), b.info);
    assert_eq!(b.successor().unwrap(), a.info);
    assert_eq!(*a.lock_predecessor().unwrap(), Some(b.info.clone()));
    assert_eq!(*b.lock_predecessor().unwrap(), Some(a.info.clone()));

    // resolving a node's own id lands on that node, from either side
    assert_eq!(b.find_successor(a.info.did).await.unwrap(), a.info);
    assert_eq!(a.find_successor(b.info.did).await.unwrap(), b.info);

    let candidates = a.successor_candidates(b.info.did, 2).await.unwrap();
    assert_eq!(candidates[0], b.info);
    assert_eq!(candidates.len(), 2);
}

#[tokio::test]
async fn test_bind_conflict_is_fatal() {
    let ports = free_ports(1);
    let a = spawn_node(ports[0], None).await;

    let addr: SocketAddr = ([127, 0, 0, 1], ports[0]).into();
    let err = endpoint::bind(addr, a.clone()).err().unwrap();
    assert!(matches!(err, Error::AddressInUse(_)));
}
