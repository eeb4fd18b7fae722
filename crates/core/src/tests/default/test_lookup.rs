use pretty_assertions::assert_eq;

use super::*;

#[tokio::test]
async fn test_two_node_ring_forms_and_routes() -> Result<()> {
    let net = MockNet::new();
    let a = prepare_node(&net, Did::from(10u32));
    let b = prepare_node(&net, Did::from(200u32));

    a.join(None).await?;
    b.join(Some(&a.info.uri)).await?;

    // the singleton answers every lookup with itself, so b's first
    // successor is a
    assert_eq!(b.successor()?, a.info);
    assert!(b
        .lock_finger()?
        .list()
        .iter()
        .all(|f| f.as_ref() == Some(&a.info)));

    let stabs = [stabilizer(&a), stabilizer(&b)];
    run_rounds(&stabs, 3).await;

    assert_eq!(a.successor()?, b.info);
    assert_eq!(b.successor()?, a.info);
    assert_eq!(*a.lock_predecessor()?, Some(b.info.clone()));
    assert_eq!(*b.lock_predecessor()?, Some(a.info.clone()));

    assert_eq!(a.find_successor(Did::from(150u32)).await?, b.info);
    assert_eq!(a.find_successor(Did::from(5u32)).await?, a.info);
    assert_eq!(b.find_successor(Did::from(150u32)).await?, b.info);
    assert_eq!(b.find_successor(Did::from(11u32)).await?, b.info);

    // mutual neighbors, but two nodes are not alone
    assert!(!a.is_alone()?);
    assert!(!b.is_alone()?);
    Ok(())
}

#[tokio::test]
async fn test_three_node_ring_lookups() -> Result<()> {
    let net = MockNet::new();
    let a = prepare_node(&net, Did::from(10u32));
    let b = prepare_node(&net, Did::from(100u32));
    let c = prepare_node(&net, Did::from(200u32));

    a.join(None).await?;
    b.join(Some(&a.info.uri)).await?;
    c.join(Some(&a.info.uri)).await?;

    let stabs = [stabilizer(&a), stabilizer(&b), stabilizer(&c)];
    run_rounds(&stabs, 8).await;

    assert_eq!(a.successor()?, b.info);
    assert_eq!(b.successor()?, c.info);
    assert_eq!(c.successor()?, a.info);
    assert_eq!(*a.lock_predecessor()?, Some(c.info.clone()));
    assert_eq!(*b.lock_predecessor()?, Some(a.info.clone()));
    assert_eq!(*c.lock_predecessor()?, Some(b.info.clone()));

    // every node resolves the same owners
    for node in [&a, &b, &c] {
        assert_eq!(node.find_successor(Did::from(50u32)).await?, b.info);
        assert_eq!(node.find_successor(Did::from(150u32)).await?, c.info);
        assert_eq!(node.find_successor(Did::from(250u32)).await?, a.info);
        // an id a node owns resolves to that node
        assert_eq!(node.find_successor(Did::from(100u32)).await?, b.info);
    }

    // the owner's neighborhood, owner first
    let candidates = a.successor_candidates(Did::from(150u32), 2).await?;
    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0], c.info);
    Ok(())
}

#[tokio::test]
async fn test_find_predecessor_walks_the_ring() -> Result<()> {
    let net = MockNet::new();
    let a = prepare_node(&net, Did::from(10u32));
    let b = prepare_node(&net, Did::from(100u32));
    let c = prepare_node(&net, Did::from(200u32));

    a.join(None).await?;
    b.join(Some(&a.info.uri)).await?;
    c.join(Some(&a.info.uri)).await?;

    let stabs = [stabilizer(&a), stabilizer(&b), stabilizer(&c)];
    run_rounds(&stabs, 8).await;

    assert_eq!(a.find_predecessor(Did::from(150u32)).await?, b.info);
    assert_eq!(b.find_predecessor(Did::from(150u32)).await?, b.info);
    assert_eq!(a.find_predecessor(Did::from(50u32)).await?, a.info);
    assert_eq!(c.find_predecessor(Did::from(250u32)).await?, c.info);

    // asking a node for the predecessor of its own id reads the pointer
    assert_eq!(a.find_predecessor(Did::from(10u32)).await?, c.info);
    Ok(())
}

#[tokio::test]
async fn test_singleton_candidates() -> Result<()> {
    let net = MockNet::new();
    let a = prepare_node(&net, Did::from(42u32));
    a.join(None).await?;

    let candidates = a.successor_candidates(Did::from(7u32), 3).await?;
    assert_eq!(candidates, vec![a.info.clone(), a.info.clone(), a.info.clone()]);
    Ok(())
}
