use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::de::{self, Deserializer, MapAccess, Visitor, value::MapAccessDeserializer};
use serde::Deserialize;
use tracing::debug;

use super::ManifestError;

/// Where a placeholder value comes from.
///
/// In TOML a bare string is a literal; tables select the other sources:
///
/// ```toml
/// [values]
/// FullName = "Chaskis IRC Bot"
/// License = { file = "LICENSE_1_0.txt" }
/// DebCheckSum = { first_line = "checksums/chaskis.deb.sha256" }
/// CoreVersion = { file = "Chaskis.Core/IrcBot.cs", pattern = 'VersionString\s*=\s*"(?P<value>[\d.]+)"' }
/// RunTime = { env = "EXE_RUNTIME", default = "net8.0" }
/// ```
///
/// A table with an unknown key, or with keys from two different sources,
/// is a parse error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    Literal(String),
    Capture { file: PathBuf, pattern: String },
    File { file: PathBuf },
    FirstLine { first_line: PathBuf },
    Env { env: String, default: Option<String> },
}

/// Every key a value-source table may carry.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SourceTable {
    file: Option<PathBuf>,
    pattern: Option<String>,
    first_line: Option<PathBuf>,
    env: Option<String>,
    default: Option<String>,
}

impl TryFrom<SourceTable> for ValueSource {
    type Error = String;

    fn try_from(t: SourceTable) -> Result<Self, Self::Error> {
        match t {
            SourceTable { file: Some(file), pattern: Some(pattern), first_line: None, env: None, default: None } => {
                Ok(ValueSource::Capture { file, pattern })
            }
            SourceTable { file: Some(file), pattern: None, first_line: None, env: None, default: None } => {
                Ok(ValueSource::File { file })
            }
            SourceTable { file: None, pattern: None, first_line: Some(first_line), env: None, default: None } => {
                Ok(ValueSource::FirstLine { first_line })
            }
            SourceTable { file: None, pattern: None, first_line: None, env: Some(env), default } => {
                Ok(ValueSource::Env { env, default })
            }
            SourceTable { pattern: Some(_), file: None, .. } => Err("`pattern` needs a `file` to search".into()),
            SourceTable { default: Some(_), env: None, .. } => Err("`default` only applies to `env`".into()),
            _ => Err("expected exactly one of `file` (optionally with `pattern`), `first_line` or `env`".into()),
        }
    }
}

impl<'de> Deserialize<'de> for ValueSource {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SourceVisitor;

        impl<'de> Visitor<'de> for SourceVisitor {
            type Value = ValueSource;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a string or a value-source table")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<ValueSource, E> {
                Ok(ValueSource::Literal(v.to_string()))
            }

            fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<ValueSource, A::Error> {
                let table = SourceTable::deserialize(MapAccessDeserializer::new(map))?;
                ValueSource::try_from(table).map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_any(SourceVisitor)
    }
}

impl ValueSource {
    /// Produce the value. Relative paths resolve against `root`.
    pub fn resolve(&self, name: &str, root: &Path) -> Result<String, ManifestError> {
        match self {
            ValueSource::Literal(value) => Ok(value.clone()),
            ValueSource::File { file } => read(name, &root.join(file)),
            ValueSource::Capture { file, pattern } => {
                let path = root.join(file);
                let regex = Regex::new(pattern).map_err(|source| ManifestError::Pattern {
                    name: name.to_string(),
                    source,
                })?;
                let contents = read(name, &path)?;
                let caps = regex.captures(&contents).ok_or_else(|| ManifestError::NoMatch {
                    name: name.to_string(),
                    path: path.clone(),
                })?;
                // A declared `value` group must take part in the match;
                // otherwise group 1, otherwise the whole match.
                let group = if regex.capture_names().any(|n| n == Some("value")) {
                    caps.name("value")
                } else if regex.captures_len() > 1 {
                    caps.get(1)
                } else {
                    caps.get(0)
                };
                let found = group
                    .map(|m| m.as_str().to_string())
                    .ok_or_else(|| ManifestError::NoMatch { name: name.to_string(), path: path.clone() })?;
                debug!(name, path = %path.display(), value = %found, "captured value");
                Ok(found)
            }
            ValueSource::FirstLine { first_line } => {
                let path = root.join(first_line);
                let contents = read(name, &path)?;
                match contents.lines().next().map(str::trim) {
                    Some(line) if !line.is_empty() => Ok(line.to_string()),
                    _ => Err(ManifestError::EmptyFile { name: name.to_string(), path }),
                }
            }
            ValueSource::Env { env, default } => match std::env::var(env) {
                Ok(value) => Ok(value),
                Err(_) => default.clone().ok_or_else(|| ManifestError::MissingEnv {
                    name: name.to_string(),
                    var: env.clone(),
                }),
            },
        }
    }
}

fn read(name: &str, path: &Path) -> Result<String, ManifestError> {
    fs::read_to_string(path).map_err(|source| ManifestError::ValueFile {
        name: name.to_string(),
        path: path.to_path_buf(),
        source,
    })
}
