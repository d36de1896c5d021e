use std::fmt;

use thiserror::Error;

use crate::source::Attempt;

#[derive(Error, Debug)]
pub enum RickError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Input could not be converted into a mapping ({})", AttemptList(.attempts))]
    InputFormat { attempts: Vec<Attempt> },

    #[error("Environment variable not set: {0}")]
    MissingEnvironmentVariable(String),

    #[error("Malformed placeholder at '{key}': {reason}")]
    MalformedPlaceholder { key: String, reason: String },

    #[error("Float at '{0}' is not finite and cannot be written as JSON")]
    NonFiniteFloat(String),

    #[error("Evaluation of '{code}' failed: {reason}")]
    Evaluation { code: String, reason: String },
}

struct AttemptList<'a>(&'a [Attempt]);

impl fmt::Display for AttemptList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("no strategy applied");
        }
        for (i, attempt) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{attempt}")?;
        }
        Ok(())
    }
}
