use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::RickError;
use crate::node::Node;
use crate::source::Source;
use crate::value::Value;

pub fn save_yaml(path: impl AsRef<Path>, node: &Node) -> Result<(), RickError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_yaml::to_writer(&mut writer, node)?;
    writer.flush()?;
    Ok(())
}

pub fn save_json(path: impl AsRef<Path>, node: &Node) -> Result<(), RickError> {
    ensure_json_floats(node)?;
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, node)?;
    writer.flush()?;
    Ok(())
}

/// Loads a YAML or JSON file without deep traversal or placeholders.
pub fn load(path: impl AsRef<Path>) -> Result<Node, RickError> {
    Node::load(Source::Path(path.as_ref().to_path_buf()))
}

pub fn exists(path: impl AsRef<Path>) -> bool {
    path.as_ref().is_file()
}

/// serde_json writes non-finite floats as `null`; refuse instead of losing them.
pub(crate) fn ensure_json_floats(node: &Node) -> Result<(), RickError> {
    fn check(path: &str, value: &Value) -> Result<(), RickError> {
        match value {
            Value::Float(v) if !v.is_finite() => Err(RickError::NonFiniteFloat(path.to_string())),
            Value::List(items) => items
                .iter()
                .enumerate()
                .try_for_each(|(i, item)| check(&format!("{path}[{i}]"), item)),
            Value::Map(map) => map
                .iter()
                .try_for_each(|(k, v)| check(&format!("{path}.{k}"), v)),
            Value::Node(node) => node
                .items()
                .try_for_each(|(k, v)| check(&format!("{path}.{k}"), v)),
            _ => Ok(()),
        }
    }

    node.items().try_for_each(|(k, v)| check(k, v))
}
