//! `type: env` placeholders.
//!
//! Lookups go through [`Env`], which reads the process environment in
//! production and a fixed set of variables in tests.

use std::collections::HashMap;

use super::{Placeholder, PlaceholderHandler};
use crate::error::RickError;
use crate::value::Value;

#[derive(Clone, Debug, Default)]
pub struct Env {
    overrides: Option<HashMap<String, String>>,
}

impl Env {
    pub fn real() -> Self {
        Self { overrides: None }
    }

    /// An environment holding exactly `vars`.
    pub fn fixed(vars: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>) -> Self {
        Self {
            overrides: Some(
                vars.into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// A set variable that is not valid UTF-8 is returned lossily rather
    /// than reported as unset.
    pub fn var(&self, name: &str) -> Option<String> {
        match &self.overrides {
            Some(map) => map.get(name).cloned(),
            None => std::env::var_os(name).map(|value| value.to_string_lossy().into_owned()),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct EnvHandler {
    env: Env,
    strict: bool,
}

impl EnvHandler {
    /// Unset variables without a `default` resolve to null.
    pub fn new() -> Self {
        Self::default()
    }

    /// Unset variables without a `default` are an error.
    pub fn strict() -> Self {
        Self {
            env: Env::real(),
            strict: true,
        }
    }

    pub fn with_env(mut self, env: Env) -> Self {
        self.env = env;
        self
    }
}

impl PlaceholderHandler for EnvHandler {
    fn kind(&self) -> &str {
        "env"
    }

    fn resolve(&self, placeholder: &Placeholder<'_>) -> Result<Value, RickError> {
        let name = placeholder
            .load()?
            .as_str()
            .ok_or_else(|| placeholder.malformed("'load' must name an environment variable"))?;

        if let Some(value) = self.env.var(name) {
            return Ok(Value::Str(value));
        }
        if let Some(default) = placeholder.default_value() {
            return Ok(default.clone());
        }
        if self.strict {
            return Err(RickError::MissingEnvironmentVariable(name.to_string()));
        }
        Ok(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Mapping;

    fn placeholder_fields(load: &str, default: Option<Value>) -> Mapping {
        let mut fields = Mapping::new();
        fields.insert("type".to_string(), Value::from("env"));
        fields.insert("load".to_string(), Value::from(load));
        if let Some(default) = default {
            fields.insert("default".to_string(), default);
        }
        fields
    }

    #[test]
    fn fixed_env_returns_set_values() {
        let env = Env::fixed([("FOO", "bar"), ("BAZ", "qux")]);
        assert_eq!(env.var("FOO").as_deref(), Some("bar"));
        assert_eq!(env.var("BAZ").as_deref(), Some("qux"));
        assert_eq!(env.var("NONEXISTENT"), None);
    }

    #[test]
    fn real_env_reads_cargo_manifest_dir() {
        assert!(Env::real().var("CARGO_MANIFEST_DIR").is_some());
    }

    #[test]
    fn set_variable_wins_over_default() {
        let handler = EnvHandler::new().with_env(Env::fixed([("HOST", "db.internal")]));
        let fields = placeholder_fields("HOST", Some(Value::from("localhost")));
        let value = handler.resolve(&Placeholder::new("host", &fields)).unwrap();
        assert_eq!(value, Value::from("db.internal"));
    }

    #[test]
    fn default_keeps_its_type() {
        let handler = EnvHandler::new().with_env(Env::fixed(Vec::<(String, String)>::new()));
        let fields = placeholder_fields("PORT", Some(Value::Int(5432)));
        let value = handler.resolve(&Placeholder::new("port", &fields)).unwrap();
        assert_eq!(value, Value::Int(5432));
    }

    #[test]
    fn unset_without_default() {
        let empty = Env::fixed(Vec::<(String, String)>::new());
        let fields = placeholder_fields("MISSING", None);
        let placeholder = Placeholder::new("missing", &fields);

        let lenient = EnvHandler::new().with_env(empty.clone());
        assert_eq!(lenient.resolve(&placeholder).unwrap(), Value::Null);

        let strict = EnvHandler::strict().with_env(empty);
        assert!(matches!(
            strict.resolve(&placeholder),
            Err(RickError::MissingEnvironmentVariable(name)) if name == "MISSING"
        ));
    }

    #[test]
    fn non_string_load_is_malformed() {
        let mut fields = Mapping::new();
        fields.insert("type".to_string(), Value::from("env"));
        fields.insert("load".to_string(), Value::Int(3));
        let handler = EnvHandler::new();
        assert!(matches!(
            handler.resolve(&Placeholder::new("x", &fields)),
            Err(RickError::MalformedPlaceholder { key, .. }) if key == "x"
        ));
    }
}
