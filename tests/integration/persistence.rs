#![allow(missing_docs)]

use braid::{
    Dir, EdgeId, EdgeType, GraphEdge, GraphNode, GraphStore, NodeId, NodeType, Result,
    StoreOptions,
};
use tempfile::tempdir;

#[test]
fn reopen_reloads_indices_but_not_adjacency() -> Result<()> {
    let dir = tempdir()?;
    {
        let store = GraphStore::open(StoreOptions::new(dir.path()))?;
        store.add_node(GraphNode::with_id("n1".into(), NodeType::User, "alice"))?;
        store.add_node(GraphNode::with_id("n2".into(), NodeType::User, "bob"))?;
        store.add_edge(GraphEdge::with_id(
            "e1".into(),
            EdgeType::Follows,
            NodeId::from("n1"),
            NodeId::from("n2"),
        ))?;
    }

    let store = GraphStore::open(StoreOptions::new(dir.path()))?;
    // indexed content is durable
    assert!(store.has_node(&NodeId::from("n1"))?);
    assert!(store.has_edge(&EdgeId::from("e1"))?);
    assert_eq!(store.stats().node_count, 2);
    assert_eq!(store.stats().edge_count, 1);
    let node = store.get_node(&NodeId::from("n1"))?.expect("node resolves");
    assert_eq!(node.identifier, "alice");

    // the graph shape is process local and starts empty
    assert_eq!(store.degree(&NodeId::from("n1"), Dir::Both), 0);
    assert!(store.out_edges(&NodeId::from("n1"), None)?.is_empty());
    Ok(())
}

#[test]
fn rebuild_adjacency_restores_traversal_after_reopen() -> Result<()> {
    let dir = tempdir()?;
    {
        let store = GraphStore::open(StoreOptions::new(dir.path()))?;
        store.add_node(GraphNode::with_id("n1".into(), NodeType::User, "alice"))?;
        store.add_node(GraphNode::with_id("n2".into(), NodeType::User, "bob"))?;
        store.add_edge(GraphEdge::with_id(
            "e1".into(),
            EdgeType::Follows,
            NodeId::from("n1"),
            NodeId::from("n2"),
        ))?;
        store.add_edge(
            GraphEdge::with_id(
                "e2".into(),
                EdgeType::Trusts,
                NodeId::from("n1"),
                NodeId::from("n2"),
            )
            .bidirectional(true),
        )?;
    }

    let store = GraphStore::open(StoreOptions::new(dir.path()))?;
    assert_eq!(store.rebuild_adjacency()?, 2);

    let n1 = NodeId::from("n1");
    let n2 = NodeId::from("n2");
    assert_eq!(store.degree(&n1, Dir::Out), 2);
    assert_eq!(store.degree(&n2, Dir::In), 2);
    assert_eq!(store.degree(&n2, Dir::Out), 1, "bidirectional mirror only");

    let out = store.out_edges(&n1, None)?;
    assert_eq!(out.len(), 2);
    assert!(
        out.iter().all(|e| e.source_id == n1 || e.target_id == n1),
        "rebuilt edges carry logical endpoints again"
    );

    let neighbors = store.neighbors(&n1, Dir::Out, None)?;
    assert_eq!(neighbors.len(), 1);
    assert_eq!(neighbors[0].id, n2);

    let between = store
        .edge_between(&n1, &n2, Some(EdgeType::Follows))?
        .expect("follows edge resolvable");
    assert_eq!(between.id.as_str(), "e1");
    Ok(())
}

#[test]
fn index_roots_are_stable_across_a_quiet_reopen() -> Result<()> {
    let dir = tempdir()?;
    let roots_before = {
        let store = GraphStore::open(StoreOptions::new(dir.path()))?;
        store.add_node(GraphNode::with_id("n1".into(), NodeType::Topic, "rust"))?;
        store.index_roots()
    };
    assert!(roots_before.nodes.is_some());
    assert!(roots_before.node_keys.is_some());

    let store = GraphStore::open(StoreOptions::new(dir.path()))?;
    assert_eq!(store.index_roots(), roots_before);

    // a write moves the node roots but leaves the edge root alone
    store.add_node(GraphNode::with_id("n2".into(), NodeType::Topic, "tries"))?;
    let roots_after = store.index_roots();
    assert_ne!(roots_after.nodes, roots_before.nodes);
    assert_eq!(roots_after.edges, roots_before.edges);
    Ok(())
}

#[test]
fn identical_logical_writes_repeat_identically() -> Result<()> {
    let dir = tempdir()?;
    let node = GraphNode::with_id("n1".into(), NodeType::User, "alice").attr("k", 1i64);
    let first = {
        let store = GraphStore::open(StoreOptions::new(dir.path()))?;
        store.add_node(node.clone())?
    };
    let store = GraphStore::open(StoreOptions::new(dir.path()))?;
    let second = store.add_node(node)?;
    assert_eq!(first, second, "same content, same address, across processes");
    Ok(())
}
