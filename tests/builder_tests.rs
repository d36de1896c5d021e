use pickle_rick::{Mapping, Node, TreeBuilder, Value};
use pretty_assertions::assert_eq;

fn mapping(json: &str) -> Result<Mapping, Box<dyn std::error::Error>> {
    Ok(serde_json::from_str(json)?)
}

#[test]
fn nested_mappings_become_nodes() -> Result<(), Box<dyn std::error::Error>> {
    let node = Node::from_mapping(mapping(r#"{"a": {"b": 1}, "c": [1, {"d": 2}]}"#)?)?;

    let a = node.field("a").and_then(Value::as_node).ok_or("a is not a node")?;
    assert_eq!(a.field("b"), Some(&Value::Int(1)));

    // Without deep traversal the list is kept exactly as loaded.
    let c = node.field("c").and_then(Value::as_list).ok_or("c is not a list")?;
    assert_eq!(c[0], Value::Int(1));
    assert!(matches!(&c[1], Value::Map(m) if m.get("d") == Some(&Value::Int(2))));
    Ok(())
}

#[test]
fn deep_traversal_internalizes_list_mappings() -> Result<(), Box<dyn std::error::Error>> {
    let node = TreeBuilder::new()
        .deep(true)
        .build_mapping(mapping(r#"{"a": {"b": 1}, "c": [{"d": 2}, "x", [{"e": 3}]]}"#)?)?;

    let c = node.field("c").and_then(Value::as_list).ok_or("c is not a list")?;
    let first = c[0].as_node().ok_or("first element is not a node")?;
    assert_eq!(first.field("d"), Some(&Value::Int(2)));
    assert_eq!(c[1], Value::from("x"));

    // Only direct elements are internalized.
    let inner = c[2].as_list().ok_or("third element is not a list")?;
    assert!(matches!(inner[0], Value::Map(_)));
    Ok(())
}

#[test]
fn deep_flag_reaches_nested_nodes() -> Result<(), Box<dyn std::error::Error>> {
    let node = TreeBuilder::new()
        .deep(true)
        .build_mapping(mapping(r#"{"outer": {"items": [{"name": "x"}]}}"#)?)?;

    let items = node
        .field("outer")
        .and_then(Value::as_node)
        .and_then(|outer| outer.field("items"))
        .and_then(Value::as_list)
        .ok_or("missing items")?;
    assert!(items[0].as_node().is_some());
    Ok(())
}

#[test]
fn fields_match_source_keys_in_order() -> Result<(), Box<dyn std::error::Error>> {
    let source = mapping(r#"{"zeta": 1, "alpha": {"k": true}, "mid": null, "list": []}"#)?;
    let node = Node::from_mapping(source.clone())?;

    let keys: Vec<&str> = node.keys().collect();
    assert_eq!(keys, vec!["zeta", "alpha", "mid", "list"]);
    assert_eq!(node.len(), source.len());
    Ok(())
}

#[test]
fn to_mapping_inverts_build() -> Result<(), Box<dyn std::error::Error>> {
    let source = mapping(
        r#"{
            "name": "svc",
            "port": 8080,
            "ratio": 0.5,
            "enabled": false,
            "nothing": null,
            "db": {"host": "localhost", "auth": {"user": "root", "password": ""}}
        }"#,
    )?;
    let node = Node::from_mapping(source.clone())?;
    assert_eq!(node.to_mapping(), source);
    assert_eq!(node.into_mapping(), source);
    Ok(())
}

#[test]
fn to_mapping_deconstructs_nodes_in_lists() -> Result<(), Box<dyn std::error::Error>> {
    let source = mapping(r#"{"servers": [{"host": "a"}, {"host": "b"}]}"#)?;
    let node = TreeBuilder::new().deep(true).build_mapping(source.clone())?;
    assert_eq!(node.to_mapping(), source);
    Ok(())
}

#[test]
fn top_level_get_matches_source() -> Result<(), Box<dyn std::error::Error>> {
    let source = mapping(r#"{"a": 1, "b": "two", "c": [3], "d": false}"#)?;
    let node = Node::from_mapping(source.clone())?;
    for (key, value) in &source {
        assert_eq!(node.get(key), Some(value));
    }
    Ok(())
}

#[test]
fn empty_mapping_builds_empty_node() -> Result<(), Box<dyn std::error::Error>> {
    let node = Node::from_mapping(Mapping::new())?;
    assert!(node.is_empty());
    assert_eq!(node.to_string(), "Node()");
    Ok(())
}
