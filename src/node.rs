use std::fmt;
use std::ops::Index;
use std::path::Path;
use std::str::FromStr;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::builder::TreeBuilder;
use crate::error::RickError;
use crate::source::Source;
use crate::storage;
use crate::value::{Mapping, Value};

/// One mapping level of a loaded document.
///
/// Fields keep the insertion order of the mapping the node was built from.
/// Nested mappings are held as child nodes; see [`TreeBuilder`] for how
/// sequences are treated.
#[derive(Debug, Clone, Default)]
pub struct Node {
    fields: Mapping,
}

impl Node {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a node from a mapping, reader, path or YAML/JSON text.
    pub fn load(source: impl Into<Source>) -> Result<Self, RickError> {
        TreeBuilder::new().build(source)
    }

    /// Same as [`Node::load`] but also internalizes mappings found in lists.
    pub fn load_deep(source: impl Into<Source>) -> Result<Self, RickError> {
        TreeBuilder::new().deep(true).build(source)
    }

    pub fn from_mapping(mapping: Mapping) -> Result<Self, RickError> {
        TreeBuilder::new().build_mapping(mapping)
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.fields.get_mut(name)
    }

    /// Assigns a field, returning the value it replaced.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(name.into(), value.into())
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Top-level field values in insertion order.
    pub fn iter(&self) -> Values<'_> {
        Values {
            inner: self.fields.values(),
        }
    }

    pub fn values(&self) -> Values<'_> {
        self.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.keys().map(String::as_str)
    }

    pub fn items(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Recursive lookup.
    ///
    /// The whole tree is searched for `key` as given, then for its lowercase
    /// form, then for its uppercase form. Each pass checks the current level
    /// before descending into child nodes and raw mappings in field order.
    /// Lists are not searched. Falsy values such as `0`, `""` or `false` are
    /// returned like any other match.
    pub fn get(&self, key: &str) -> Option<&Value> {
        let lower = key.to_lowercase();
        let upper = key.to_uppercase();
        [key, lower.as_str(), upper.as_str()]
            .into_iter()
            .find_map(|candidate| search(&self.fields, candidate))
    }

    pub fn get_or<'a>(&'a self, key: &str, default: &'a Value) -> &'a Value {
        self.get(key).unwrap_or(default)
    }

    /// Presence check. With `deep`, searches nested nodes and mappings
    /// for the exact key; no case folding is applied.
    pub fn has(&self, key: &str, deep: bool) -> bool {
        if self.fields.contains_key(key) {
            return true;
        }
        deep && search(&self.fields, key).is_some()
    }

    /// Deconstructs the tree into a plain mapping with no nodes left in it.
    pub fn to_mapping(&self) -> Mapping {
        self.fields
            .iter()
            .map(|(k, v)| (k.clone(), v.to_plain()))
            .collect()
    }

    pub fn into_mapping(self) -> Mapping {
        self.fields
            .into_iter()
            .map(|(k, v)| (k, v.into_plain()))
            .collect()
    }

    pub fn to_yaml_string(&self) -> Result<String, RickError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Fails with [`RickError::NonFiniteFloat`] if the tree holds NaN or an
    /// infinity, which JSON cannot represent.
    pub fn to_json_string(&self) -> Result<String, RickError> {
        storage::ensure_json_floats(self)?;
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_string_pretty(&self) -> Result<String, RickError> {
        storage::ensure_json_floats(self)?;
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> Result<(), RickError> {
        storage::save_yaml(path, self)
    }

    pub fn to_json_file(&self, path: impl AsRef<Path>) -> Result<(), RickError> {
        storage::save_json(path, self)
    }
}

fn search<'a>(fields: &'a Mapping, key: &str) -> Option<&'a Value> {
    if let Some(value) = fields.get(key) {
        return Some(value);
    }
    fields.values().find_map(|value| match value {
        Value::Node(node) => search(&node.fields, key),
        Value::Map(map) => search(map, key),
        _ => None,
    })
}

/// Iterator over a node's top-level values.
#[derive(Clone)]
pub struct Values<'a> {
    inner: indexmap::map::Values<'a, String, Value>,
}

impl<'a> Iterator for Values<'a> {
    type Item = &'a Value;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Values<'_> {}

impl<'a> IntoIterator for &'a Node {
    type Item = &'a Value;
    type IntoIter = Values<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Index<&str> for Node {
    type Output = Value;

    fn index(&self, name: &str) -> &Value {
        &self.fields[name]
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Node(")?;
        for (i, (k, v)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{k}={v}")?;
        }
        f.write_str(")")
    }
}

/// Structural equality through the canonical rendering.
impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl FromStr for Node {
    type Err = RickError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Node::load(s)
    }
}
