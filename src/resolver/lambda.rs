//! `type: lambda` placeholders.
//!
//! With evaluation disabled (the default) the `load` value is stored as-is.
//! With evaluation enabled the `load` string is handed to an [`Evaluator`];
//! [`ShellEvaluator`] runs it through `sh -c`. Anyone who can write the
//! document can then run arbitrary commands as the loading process.

use std::process::Command;

use tracing::{debug, warn};

use super::{Placeholder, PlaceholderHandler};
use crate::error::RickError;
use crate::value::Value;

pub trait Evaluator {
    fn evaluate(&self, code: &str) -> Result<Value, RickError>;
}

/// Runs code with `sh -c` and reads the result from stdout.
///
/// Trimmed output is parsed as a YAML scalar, so `42` becomes an integer
/// and `true` a boolean. Anything that does not parse to a scalar is kept
/// as a string.
#[derive(Debug, Clone, Default)]
pub struct ShellEvaluator;

impl Evaluator for ShellEvaluator {
    fn evaluate(&self, code: &str) -> Result<Value, RickError> {
        let output = Command::new("sh")
            .arg("-c")
            .arg(code)
            .output()
            .map_err(|e| RickError::Evaluation {
                code: code.to_string(),
                reason: format!("failed to execute: {e}"),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RickError::Evaluation {
                code: code.to_string(),
                reason: format!(
                    "exit code {}: {}",
                    output.status.code().unwrap_or(-1),
                    stderr.trim()
                ),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(parse_scalar(stdout.trim()))
    }
}

fn parse_scalar(text: &str) -> Value {
    if text.is_empty() {
        return Value::Str(String::new());
    }
    match serde_yaml::from_str::<Value>(text) {
        Ok(value @ (Value::Null | Value::Bool(_) | Value::Int(_) | Value::Float(_))) => value,
        _ => Value::Str(text.to_string()),
    }
}

pub struct LambdaHandler {
    load_lambda: bool,
    evaluator: Box<dyn Evaluator>,
}

impl LambdaHandler {
    pub fn new(load_lambda: bool) -> Self {
        Self::with_evaluator(load_lambda, ShellEvaluator)
    }

    pub fn with_evaluator(load_lambda: bool, evaluator: impl Evaluator + 'static) -> Self {
        Self {
            load_lambda,
            evaluator: Box::new(evaluator),
        }
    }

    pub fn evaluates(&self) -> bool {
        self.load_lambda
    }
}

impl PlaceholderHandler for LambdaHandler {
    fn kind(&self) -> &str {
        "lambda"
    }

    fn resolve(&self, placeholder: &Placeholder<'_>) -> Result<Value, RickError> {
        let load = placeholder.load()?;
        if !self.load_lambda {
            debug!(key = placeholder.key(), "lambda evaluation disabled, keeping source");
            return Ok(load.clone());
        }

        let code = load
            .as_str()
            .ok_or_else(|| placeholder.malformed("'load' must be a code string"))?;
        warn!(key = placeholder.key(), code, "evaluating lambda placeholder");
        self.evaluator.evaluate(code)
    }
}

impl std::fmt::Debug for LambdaHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LambdaHandler")
            .field("load_lambda", &self.load_lambda)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_output_is_typed() {
        assert_eq!(parse_scalar("42"), Value::Int(42));
        assert_eq!(parse_scalar("2.5"), Value::Float(2.5));
        assert_eq!(parse_scalar("true"), Value::Bool(true));
        assert_eq!(parse_scalar("hello world"), Value::from("hello world"));
        assert_eq!(parse_scalar(""), Value::from(""));
    }

    #[test]
    fn structured_output_stays_text() {
        assert_eq!(parse_scalar("a: 1"), Value::from("a: 1"));
        assert_eq!(parse_scalar("[1, 2]"), Value::from("[1, 2]"));
    }
}
