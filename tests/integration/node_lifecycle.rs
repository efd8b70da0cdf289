#![allow(missing_docs)]

use braid::{
    AttrValue, GraphNode, GraphStore, NodeId, NodeType, Result, StoreOptions, UpdateNode,
};
use tempfile::tempdir;

fn open(dir: &tempfile::TempDir) -> Result<GraphStore> {
    GraphStore::open(StoreOptions::new(dir.path()))
}

#[test]
fn add_get_roundtrip_cache_and_persistence_paths() -> Result<()> {
    let dir = tempdir()?;
    let store = open(&dir)?;
    let node = GraphNode::with_id("n1".into(), NodeType::User, "alice")
        .name("Alice")
        .attr("karma", 42i64);
    store.add_node(node.clone())?;

    // cache path
    let cached = store.get_node(&NodeId::from("n1"))?.expect("node resolves");
    assert_eq!(cached.node_type, NodeType::User);
    assert_eq!(cached.identifier, "alice");
    assert_eq!(cached.attributes.get("karma"), Some(&AttrValue::Int(42)));

    // persistence path
    store.clear_cache();
    let persisted = store
        .get_node(&NodeId::from("n1"))?
        .expect("node resolves after cache clear");
    assert_eq!(persisted.id, NodeId::from("n1"));
    assert_eq!(persisted.node_type, cached.node_type);
    assert_eq!(persisted.identifier, cached.identifier);
    assert_eq!(persisted.attributes, cached.attributes);
    Ok(())
}

#[test]
fn absence_is_a_normal_result() -> Result<()> {
    let dir = tempdir()?;
    let store = open(&dir)?;
    assert!(store.get_node(&NodeId::from("missing"))?.is_none());
    assert!(!store.has_node(&NodeId::from("missing"))?);
    assert!(!store.delete_node(&NodeId::from("missing"))?);
    assert!(store.get_node_by_key(NodeType::User, "nobody")?.is_none());
    Ok(())
}

#[test]
fn readd_is_a_full_overwrite_at_a_new_address() -> Result<()> {
    let dir = tempdir()?;
    let store = open(&dir)?;
    let first = store.add_node(
        GraphNode::with_id("n1".into(), NodeType::User, "alice").attr("a", 1i64),
    )?;
    let second = store.add_node(
        GraphNode::with_id("n1".into(), NodeType::User, "alice").attr("b", 2i64),
    )?;
    assert_ne!(first, second, "overwrite lands at a new content address");

    store.clear_cache();
    let node = store.get_node(&NodeId::from("n1"))?.expect("node resolves");
    assert!(node.attributes.get("a").is_none(), "no field-level merge");
    assert_eq!(node.attributes.get("b"), Some(&AttrValue::Int(2)));
    assert_eq!(store.stats().node_count, 1, "same logical id, one entry");
    Ok(())
}

#[test]
fn update_merges_attributes_and_overwrites() -> Result<()> {
    let dir = tempdir()?;
    let store = open(&dir)?;
    store.add_node(
        GraphNode::with_id("n1".into(), NodeType::User, "alice")
            .attr("kept", "yes")
            .attr("replaced", 1i64),
    )?;

    let updated = store
        .update_node(
            &NodeId::from("n1"),
            UpdateNode::new().attr("replaced", 2i64).name("Alice"),
        )?
        .expect("node exists");
    assert_eq!(updated.attributes.get("kept"), Some(&AttrValue::Text("yes".into())));
    assert_eq!(updated.attributes.get("replaced"), Some(&AttrValue::Int(2)));
    assert_eq!(updated.name.as_deref(), Some("Alice"));

    assert!(store
        .update_node(&NodeId::from("missing"), UpdateNode::new())?
        .is_none());
    Ok(())
}

#[test]
fn has_node_bypasses_cache() -> Result<()> {
    let dir = tempdir()?;
    let store = open(&dir)?;
    store.add_node(GraphNode::with_id("n1".into(), NodeType::Topic, "rust"))?;
    store.clear_cache();
    assert!(store.has_node(&NodeId::from("n1"))?);
    Ok(())
}

#[test]
fn get_node_by_key_resolves_through_the_type_key_index() -> Result<()> {
    let dir = tempdir()?;
    let store = open(&dir)?;
    store.add_node(GraphNode::with_id("n1".into(), NodeType::User, "alice"))?;
    store.add_node(GraphNode::with_id("n2".into(), NodeType::Topic, "alice"))?;

    // the same identifier under two kinds stays distinct
    let user = store
        .get_node_by_key(NodeType::User, "alice")?
        .expect("user key resolves");
    assert_eq!(user.id, NodeId::from("n1"));
    let topic = store
        .get_node_by_key(NodeType::Topic, "alice")?
        .expect("topic key resolves");
    assert_eq!(topic.id, NodeId::from("n2"));
    Ok(())
}

#[test]
fn delete_removes_both_index_entries() -> Result<()> {
    let dir = tempdir()?;
    let store = open(&dir)?;
    store.add_node(GraphNode::with_id("n1".into(), NodeType::User, "alice"))?;
    assert!(store.delete_node(&NodeId::from("n1"))?);

    assert!(!store.has_node(&NodeId::from("n1"))?);
    assert!(store.get_node_by_key(NodeType::User, "alice")?.is_none());
    assert_eq!(store.stats().node_count, 0);
    // deleting again is a miss, not an error
    assert!(!store.delete_node(&NodeId::from("n1"))?);
    Ok(())
}
