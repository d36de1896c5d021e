use std::fmt;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::RickError;
use crate::value::{Mapping, Value};

/// Something a node tree can be loaded from.
pub enum Source {
    Mapping(Mapping),
    /// An open stream. Read to the end once, then parsed.
    Reader(Box<dyn Read>),
    Path(PathBuf),
    /// A path to an existing file, otherwise inline YAML or JSON.
    Text(String),
}

impl Source {
    pub fn reader(reader: impl Read + 'static) -> Self {
        Source::Reader(Box::new(reader))
    }
}

impl From<Mapping> for Source {
    fn from(mapping: Mapping) -> Self {
        Source::Mapping(mapping)
    }
}

impl From<&str> for Source {
    fn from(text: &str) -> Self {
        Source::Text(text.to_string())
    }
}

impl From<String> for Source {
    fn from(text: String) -> Self {
        Source::Text(text)
    }
}

impl From<&Path> for Source {
    fn from(path: &Path) -> Self {
        Source::Path(path.to_path_buf())
    }
}

impl From<PathBuf> for Source {
    fn from(path: PathBuf) -> Self {
        Source::Path(path)
    }
}

impl From<&PathBuf> for Source {
    fn from(path: &PathBuf) -> Self {
        Source::Path(path.clone())
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Mapping(m) => f.debug_tuple("Mapping").field(m).finish(),
            Source::Reader(_) => f.write_str("Reader(..)"),
            Source::Path(p) => f.debug_tuple("Path").field(p).finish(),
            Source::Text(t) => f.debug_tuple("Text").field(t).finish(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    StreamYaml,
    StreamJson,
    FileYaml,
    FileJson,
    TextYaml,
    TextJson,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::StreamYaml => "stream as YAML",
            Strategy::StreamJson => "stream as JSON",
            Strategy::FileYaml => "file as YAML",
            Strategy::FileJson => "file as JSON",
            Strategy::TextYaml => "text as YAML",
            Strategy::TextJson => "text as JSON",
        };
        f.write_str(name)
    }
}

/// A failed parsing strategy and why it failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub strategy: Strategy,
    pub reason: String,
}

impl fmt::Display for Attempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.strategy, self.reason)
    }
}

#[derive(Default)]
struct Attempts(Vec<Attempt>);

impl Attempts {
    fn record(&mut self, strategy: Strategy, reason: impl fmt::Display) {
        let reason = reason.to_string();
        debug!(%strategy, %reason, "input strategy failed");
        self.0.push(Attempt { strategy, reason });
    }

    /// YAML first, then JSON, over the same text.
    fn parse(&mut self, text: &str, yaml: Strategy, json: Strategy) -> Option<Mapping> {
        match parse_yaml(text) {
            Ok(value) => match into_mapping(value) {
                Ok(mapping) => return Some(mapping),
                Err(reason) => self.record(yaml, reason),
            },
            Err(e) => self.record(yaml, e),
        }
        match serde_json::from_str::<Value>(text) {
            Ok(value) => match into_mapping(value) {
                Ok(mapping) => return Some(mapping),
                Err(reason) => self.record(json, reason),
            },
            Err(e) => self.record(json, e),
        }
        None
    }

    fn exhausted(self) -> RickError {
        RickError::InputFormat { attempts: self.0 }
    }
}

fn into_mapping(value: Value) -> Result<Mapping, String> {
    match value {
        Value::Map(mapping) => Ok(mapping),
        Value::Null => Err("document is empty".to_string()),
        Value::Bool(_) => Err("document root is a boolean, expected a mapping".to_string()),
        Value::Int(_) | Value::Float(_) => {
            Err("document root is a number, expected a mapping".to_string())
        }
        Value::Str(_) => Err("document root is a string, expected a mapping".to_string()),
        Value::List(_) => Err("document root is a list, expected a mapping".to_string()),
        Value::Node(node) => Ok(node.into_mapping()),
    }
}

/// Parses YAML with `<<` merge keys applied. Keys already present in the
/// merging mapping win over merged ones.
fn parse_yaml(text: &str) -> Result<Value, serde_yaml::Error> {
    let mut document: serde_yaml::Value = serde_yaml::from_str(text)?;
    document.apply_merge()?;
    serde_yaml::from_value(document)
}

fn read_file(path: &Path) -> io::Result<String> {
    let mut file = fs::File::open(path)?;
    let mut text = String::new();
    file.read_to_string(&mut text)?;
    Ok(text)
}

/// Turns a source into a raw mapping, trying each applicable strategy in
/// order. Failures are logged and collected; only exhaustion is an error.
pub fn resolve(source: Source) -> Result<Mapping, RickError> {
    let mut attempts = Attempts::default();

    match source {
        Source::Mapping(mapping) => return Ok(mapping),
        Source::Reader(mut reader) => {
            let mut text = String::new();
            match reader.read_to_string(&mut text) {
                Ok(_) => {
                    if let Some(mapping) =
                        attempts.parse(&text, Strategy::StreamYaml, Strategy::StreamJson)
                    {
                        return Ok(mapping);
                    }
                }
                Err(e) => attempts.record(Strategy::StreamYaml, e),
            }
        }
        Source::Path(path) => match read_file(&path) {
            Ok(text) => {
                if let Some(mapping) = attempts.parse(&text, Strategy::FileYaml, Strategy::FileJson)
                {
                    return Ok(mapping);
                }
            }
            Err(e) => attempts.record(Strategy::FileYaml, format!("{}: {e}", path.display())),
        },
        Source::Text(text) => {
            let path = Path::new(&text);
            if path.is_file() {
                match read_file(path) {
                    Ok(contents) => {
                        if let Some(mapping) =
                            attempts.parse(&contents, Strategy::FileYaml, Strategy::FileJson)
                        {
                            return Ok(mapping);
                        }
                    }
                    Err(e) => attempts.record(Strategy::FileYaml, e),
                }
            }
            if let Some(mapping) = attempts.parse(&text, Strategy::TextYaml, Strategy::TextJson) {
                return Ok(mapping);
            }
        }
    }

    Err(attempts.exhausted())
}
