//! Placeholder resolution.
//!
//! A placeholder is a nested mapping whose `type` field names a registered
//! handler, for example:
//!
//! ```yaml
//! password:
//!   type: env
//!   load: DB_PASSWORD
//!   default: hunter2
//! ```
//!
//! While the tree is built, the handler's result replaces the mapping
//! instead of a child node being created.

pub mod env;
pub mod lambda;

use std::collections::HashMap;

use tracing::debug;

use crate::error::RickError;
use crate::value::{Mapping, Value};

pub use env::{Env, EnvHandler};
pub use lambda::{Evaluator, LambdaHandler, ShellEvaluator};

pub const TYPE_FIELD: &str = "type";
pub const LOAD_FIELD: &str = "load";
pub const DEFAULT_FIELD: &str = "default";

/// Borrowed view of a placeholder mapping.
#[derive(Debug, Clone, Copy)]
pub struct Placeholder<'a> {
    key: &'a str,
    fields: &'a Mapping,
}

impl<'a> Placeholder<'a> {
    pub fn new(key: &'a str, fields: &'a Mapping) -> Self {
        Self { key, fields }
    }

    /// Field name the placeholder is stored under in its parent.
    pub fn key(&self) -> &'a str {
        self.key
    }

    pub fn fields(&self) -> &'a Mapping {
        self.fields
    }

    pub fn field(&self, name: &str) -> Option<&'a Value> {
        self.fields.get(name)
    }

    pub fn load(&self) -> Result<&'a Value, RickError> {
        self.field(LOAD_FIELD)
            .ok_or_else(|| self.malformed(format!("missing '{LOAD_FIELD}' field")))
    }

    pub fn default_value(&self) -> Option<&'a Value> {
        self.field(DEFAULT_FIELD)
    }

    pub fn malformed(&self, reason: impl Into<String>) -> RickError {
        RickError::MalformedPlaceholder {
            key: self.key.to_string(),
            reason: reason.into(),
        }
    }
}

pub trait PlaceholderHandler {
    /// Value of the `type` field this handler claims.
    fn kind(&self) -> &str;

    fn resolve(&self, placeholder: &Placeholder<'_>) -> Result<Value, RickError>;
}

/// Set of placeholder handlers keyed by their `type` value.
#[derive(Default)]
pub struct ResolverRegistry {
    handlers: HashMap<String, Box<dyn PlaceholderHandler>>,
}

impl ResolverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// `env` and `lambda` handlers. `load_lambda` lets configuration run
    /// shell code; never enable it for documents you do not trust.
    pub fn standard(load_lambda: bool) -> Self {
        Self::new()
            .with(EnvHandler::new())
            .with(LambdaHandler::new(load_lambda))
    }

    /// Adds a handler, replacing any previous handler of the same kind.
    pub fn register(&mut self, handler: impl PlaceholderHandler + 'static) {
        self.handlers
            .insert(handler.kind().to_string(), Box::new(handler));
    }

    pub fn with(mut self, handler: impl PlaceholderHandler + 'static) -> Self {
        self.register(handler);
        self
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> + '_ {
        self.handlers.keys().map(String::as_str)
    }

    /// Resolves `mapping` if it is a placeholder. `Ok(None)` means the
    /// mapping should be built as an ordinary child node.
    pub fn resolve(&self, key: &str, mapping: &Mapping) -> Result<Option<Value>, RickError> {
        let Some(kind) = mapping.get(TYPE_FIELD).and_then(Value::as_str) else {
            return Ok(None);
        };
        let Some(handler) = self.handlers.get(kind) else {
            return Ok(None);
        };

        let value = handler.resolve(&Placeholder::new(key, mapping))?;
        debug!(key, kind, "resolved placeholder");
        Ok(Some(value))
    }
}

impl std::fmt::Debug for ResolverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<&str> = self.kinds().collect();
        kinds.sort_unstable();
        f.debug_struct("ResolverRegistry")
            .field("kinds", &kinds)
            .finish()
    }
}
