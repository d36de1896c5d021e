use tracing::trace;

use crate::error::RickError;
use crate::node::Node;
use crate::resolver::ResolverRegistry;
use crate::source::{Source, resolve};
use crate::value::{Mapping, Value};

/// Converts raw documents into [`Node`] trees.
///
/// Nested mappings always become child nodes. Mappings inside lists become
/// nodes only when `deep` is set; otherwise lists are stored as they were
/// loaded, raw mappings included. Only the direct elements of a list are
/// considered, so a list nested in a list is left untouched either way.
///
/// With a resolver attached, nested mappings that are placeholders are
/// replaced by their resolved value. List elements are never treated as
/// placeholders themselves.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    deep: bool,
    resolver: Option<ResolverRegistry>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deep(mut self, deep: bool) -> Self {
        self.deep = deep;
        self
    }

    pub fn resolver(mut self, registry: ResolverRegistry) -> Self {
        self.resolver = Some(registry);
        self
    }

    pub fn is_deep(&self) -> bool {
        self.deep
    }

    pub fn build(&self, source: impl Into<Source>) -> Result<Node, RickError> {
        let mapping = resolve(source.into())?;
        self.build_mapping(mapping)
    }

    pub fn build_mapping(&self, mapping: Mapping) -> Result<Node, RickError> {
        let mut node = Node::new();
        for (key, value) in mapping {
            let value = match value {
                Value::Map(inner) => self.build_child(&key, inner)?,
                Value::List(items) if self.deep => Value::List(
                    items
                        .into_iter()
                        .map(|item| match item {
                            Value::Map(inner) => self.build_mapping(inner).map(Value::Node),
                            other => Ok(other),
                        })
                        .collect::<Result<_, _>>()?,
                ),
                other => other,
            };
            node.set(key, value);
        }
        Ok(node)
    }

    fn build_child(&self, key: &str, inner: Mapping) -> Result<Value, RickError> {
        if let Some(resolver) = &self.resolver {
            if let Some(resolved) = resolver.resolve(key, &inner)? {
                return Ok(resolved);
            }
        }
        trace!(key, fields = inner.len(), "internalizing child node");
        self.build_mapping(inner).map(Value::Node)
    }
}
