//! Build manifest: which templates to render, where to write them, and
//! where every placeholder value comes from.
//!
//! All values are resolved once, up front, into a single
//! [`PlaceholderMap`] shared by every template in the manifest.
//!
//! ```toml
//! [values]
//! FullName = "Chaskis IRC Bot"
//! License = { file = "LICENSE_1_0.txt" }
//!
//! [[template]]
//! source = "install/windows/Product.wxs.template"
//! target = "install/windows/Product.wxs"
//! defines = ["WINDOWS"]
//!
//! [[template]]
//! source = "install/linux/arch/PKGBUILD.template"
//! target = "install/linux/arch/PKGBUILD"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::template::{Defines, PlaceholderMap};

pub mod values;

pub use values::ValueSource;

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("cannot read manifest {}: {source}", .path.display())]
    Read { path: PathBuf, source: std::io::Error },
    #[error("invalid manifest {}: {source}", .path.display())]
    Parse { path: PathBuf, source: toml::de::Error },
    #[error("value '{name}': cannot read {}: {source}", .path.display())]
    ValueFile { name: String, path: PathBuf, source: std::io::Error },
    #[error("value '{name}': invalid pattern: {source}")]
    Pattern { name: String, source: regex::Error },
    #[error("value '{name}': pattern did not match anything in {}", .path.display())]
    NoMatch { name: String, path: PathBuf },
    #[error("value '{name}': environment variable {var} is not set")]
    MissingEnv { name: String, var: String },
    #[error("value '{name}': {} is empty", .path.display())]
    EmptyFile { name: String, path: PathBuf },
    #[error("value name '{name}' is not a placeholder identifier (letters and digits only)")]
    InvalidName { name: String },
}

impl ManifestError {
    pub fn code(&self) -> &'static str {
        match self {
            ManifestError::Read { .. } => "TPL-M001",
            ManifestError::Parse { .. } => "TPL-M002",
            ManifestError::ValueFile { .. } => "TPL-M003",
            ManifestError::Pattern { .. } => "TPL-M004",
            ManifestError::NoMatch { .. } => "TPL-M005",
            ManifestError::MissingEnv { .. } => "TPL-M006",
            ManifestError::EmptyFile { .. } => "TPL-M007",
            ManifestError::InvalidName { .. } => "TPL-M008",
        }
    }
}

/// One `[[template]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateEntry {
    pub source: PathBuf,
    pub target: PathBuf,
    #[serde(default)]
    pub defines: Vec<String>,
}

impl TemplateEntry {
    pub fn defines(&self) -> Defines {
        self.defines.iter().cloned().collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub values: BTreeMap<String, ValueSource>,
    #[serde(default, rename = "template")]
    pub templates: Vec<TemplateEntry>,
    /// Directory relative paths resolve against.
    #[serde(skip)]
    root: PathBuf,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let text = fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    /// Parse manifest text as if it had been read from `path`.
    pub fn parse(text: &str, path: &Path) -> Result<Self, ManifestError> {
        let mut manifest: Manifest = toml::from_str(text).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        manifest.root = path.parent().map(Path::to_path_buf).unwrap_or_default();
        debug!(
            path = %path.display(),
            values = manifest.values.len(),
            templates = manifest.templates.len(),
            "loaded manifest"
        );
        Ok(manifest)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    /// Run every value source once.
    pub fn resolve_values(&self) -> Result<PlaceholderMap, ManifestError> {
        let mut out = PlaceholderMap::new();
        for (name, source) in &self.values {
            if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(ManifestError::InvalidName { name: name.clone() });
            }
            let value = source.resolve(name, &self.root)?;
            out.insert(name.clone(), value);
        }
        debug!(count = out.len(), "resolved placeholder values");
        Ok(out)
    }
}
