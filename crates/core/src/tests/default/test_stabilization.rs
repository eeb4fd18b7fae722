use pretty_assertions::assert_eq;

use super::*;
use crate::consts::HASH_BIT;
use crate::dht::finger_start;

async fn converged_trio(
    net: &Arc<MockNet>,
) -> Result<(Arc<Ring>, Arc<Ring>, Arc<Ring>, Vec<Stabilizer>)> {
    let a = prepare_node(net, Did::from(10u32));
    let b = prepare_node(net, Did::from(100u32));
    let c = prepare_node(net, Did::from(200u32));

    a.join(None).await?;
    b.join(Some(&a.info.uri)).await?;
    c.join(Some(&a.info.uri)).await?;

    let stabs = vec![stabilizer(&a), stabilizer(&b), stabilizer(&c)];
    run_rounds(&stabs, 8).await;

    assert_eq!(a.successor()?, b.info);
    assert_eq!(b.successor()?, c.info);
    assert_eq!(c.successor()?, a.info);
    Ok((a, b, c, stabs))
}

#[tokio::test]
async fn test_singleton_becomes_alone_after_first_tick() -> Result<()> {
    let net = MockNet::new();
    let a = prepare_node(&net, Did::from(42u32));
    a.join(None).await?;
    assert!(!a.is_alone()?);
    assert!(!a.is_in_ring());

    // the first tick makes the node notify itself
    stabilizer(&a).run_cycle().await?;
    assert!(a.is_alone()?);
    assert!(a.is_in_ring());
    Ok(())
}

#[tokio::test]
async fn test_graceful_leave_reroutes_within_one_tick() -> Result<()> {
    let net = MockNet::new();
    let (a, b, c, _stabs) = converged_trio(&net).await?;

    b.leave().await?;
    assert!(!b.is_active());

    // neighbors were rewired by the departure notices alone
    assert_eq!(a.successor()?, c.info);
    assert_eq!(*c.lock_predecessor()?, Some(a.info.clone()));

    // the departed node no longer appears in lookups
    assert_eq!(a.find_successor(Did::from(50u32)).await?, c.info);
    assert_eq!(c.find_successor(Did::from(50u32)).await?, c.info);
    Ok(())
}

#[tokio::test]
async fn test_silent_crash_fails_over_within_slist_ticks() -> Result<()> {
    let net = MockNet::new();
    let (a, b, c, _) = converged_trio(&net).await?;

    net.kill(&b.info.uri);

    // R = 3 here; the survivors need at most R rounds
    let survivors = [stabilizer(&a), stabilizer(&c)];
    run_rounds(&survivors, 3).await;

    assert_eq!(a.successor()?, c.info);
    assert_eq!(c.successor()?, a.info);
    assert_eq!(*a.lock_predecessor()?, Some(c.info.clone()));
    assert_eq!(*c.lock_predecessor()?, Some(a.info.clone()));

    assert_eq!(a.find_successor(Did::from(50u32)).await?, c.info);
    assert_eq!(c.find_successor(Did::from(50u32)).await?, c.info);

    // the dead node is gone from both successor lists
    for node in [&a, &c] {
        assert!(!node.lock_successors()?.list().contains(&b.info));
    }
    Ok(())
}

#[tokio::test]
async fn test_losing_every_peer_deactivates_the_node() -> Result<()> {
    let net = MockNet::new();
    let a = prepare_node(&net, Did::from(10u32));
    let b = prepare_node(&net, Did::from(200u32));

    a.join(None).await?;
    b.join(Some(&a.info.uri)).await?;
    // b's entire routing state points at a
    net.kill(&a.info.uri);

    stabilizer(&b).run_cycle().await.ok();

    assert!(!b.is_active());
    assert!(!b.is_in_ring());
    Ok(())
}

#[tokio::test]
async fn test_successor_list_head_matches_first_finger() -> Result<()> {
    let net = MockNet::new();
    let (a, b, c, stabs) = converged_trio(&net).await?;
    run_rounds(&stabs, 2).await;

    for node in [&a, &b, &c] {
        assert_eq!(
            node.lock_successors()?.head(),
            node.lock_finger()?.first()
        );
        // next successors run clockwise
        assert_eq!(node.lock_successors()?.len(), 3);
    }
    assert_eq!(a.lock_successors()?.list(), vec![
        b.info.clone(),
        c.info.clone(),
        a.info.clone()
    ]);
    Ok(())
}

#[tokio::test]
async fn test_fingers_converge_on_even_ring() -> Result<()> {
    let net = MockNet::new();
    let dids = spread_dids(8);

    let nodes: Vec<Arc<Ring>> = dids.iter().map(|did| prepare_node(&net, *did)).collect();
    nodes[0].join(None).await?;
    for node in nodes.iter().skip(1) {
        node.join(Some(&nodes[0].info.uri)).await?;
    }

    let stabs: Vec<Stabilizer> = nodes.iter().map(stabilizer).collect();
    // a handful of rounds settles successors and predecessors, then one
    // full sweep refreshes every finger at least once
    run_rounds(&stabs, HASH_BIT + 12).await;

    for (i, node) in nodes.iter().enumerate() {
        let next = &nodes[(i + 1) % nodes.len()];
        let prev = &nodes[(i + nodes.len() - 1) % nodes.len()];
        assert_eq!(node.successor()?, next.info, "successor of node {}", i);
        assert_eq!(
            *node.lock_predecessor()?,
            Some(prev.info.clone()),
            "predecessor of node {}",
            i
        );

        let finger = node.lock_finger()?;
        for k in 0..HASH_BIT {
            let start = finger_start(node.info.did, k);
            let owner = expected_owner(&dids, start);
            assert_eq!(
                finger.get(k).map(|peer| peer.did),
                Some(owner),
                "finger {} of node {}",
                k,
                i
            );
        }
    }
    Ok(())
}
