use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::manifest::{Manifest, ManifestError, TemplateEntry};
use crate::template::{PlaceholderMap, RenderError, Template};

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    #[error("cannot read template {}: {source}", .path.display())]
    Read { path: PathBuf, source: std::io::Error },
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("cannot write {}: {source}", .path.display())]
    Write { path: PathBuf, source: std::io::Error },
}

impl BuildError {
    pub fn code(&self) -> &'static str {
        match self {
            BuildError::Manifest(e) => e.code(),
            BuildError::Read { .. } => "TPL-B001",
            BuildError::Render(e) => e.code(),
            BuildError::Write { .. } => "TPL-B002",
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
    /// Continue with the remaining templates after one fails.
    pub keep_going: bool,
    /// Render everything but write nothing.
    pub dry_run: bool,
}

/// A template that did not render or could not be written.
#[derive(Debug)]
pub struct Failure {
    pub source: PathBuf,
    pub error: BuildError,
    /// Template text, when it was read, for source snippets in diagnostics.
    pub text: Option<String>,
}

#[derive(Debug, Default)]
pub struct BuildReport {
    /// Targets rendered (and written, unless dry-run), in manifest order.
    pub rendered: Vec<PathBuf>,
    pub failures: Vec<Failure>,
}

impl BuildReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Render every template in `manifest`.
///
/// Values are resolved first; a failure there aborts the whole build. After
/// that each template is all-or-nothing: its target is only written once it
/// rendered completely.
pub fn build(manifest: &Manifest, options: &BuildOptions) -> Result<BuildReport, BuildError> {
    let values = manifest.resolve_values()?;
    let mut report = BuildReport::default();

    for entry in &manifest.templates {
        match build_one(manifest, entry, &values, options) {
            Ok(target) => report.rendered.push(target),
            Err(failure) => {
                warn!(
                    template = %failure.source.display(),
                    code = failure.error.code(),
                    "template failed: {}",
                    failure.error
                );
                report.failures.push(failure);
                if !options.keep_going {
                    break;
                }
            }
        }
    }

    info!(
        rendered = report.rendered.len(),
        failed = report.failures.len(),
        dry_run = options.dry_run,
        "build finished"
    );
    Ok(report)
}

fn build_one(
    manifest: &Manifest,
    entry: &TemplateEntry,
    values: &PlaceholderMap,
    options: &BuildOptions,
) -> Result<PathBuf, Failure> {
    let source = manifest.resolve_path(&entry.source);
    let target = manifest.resolve_path(&entry.target);

    let text = fs::read_to_string(&source).map_err(|e| Failure {
        source: source.clone(),
        error: BuildError::Read { path: source.clone(), source: e },
        text: None,
    })?;

    let template = Template::new(source.display().to_string(), text);
    let rendered = template.render(&entry.defines(), values).map_err(|e| Failure {
        source: source.clone(),
        error: BuildError::Render(e),
        text: Some(template.text().to_string()),
    })?;

    if options.dry_run {
        debug!(source = %source.display(), target = %target.display(), "rendered (dry run)");
        return Ok(target);
    }

    write(&target, &rendered).map_err(|error| Failure {
        source: source.clone(),
        error,
        text: None,
    })?;
    info!(source = %source.display(), target = %target.display(), "rendered");
    Ok(target)
}

/// Write `contents` to `path`, creating parent directories.
pub fn write(path: &Path, contents: &str) -> Result<(), BuildError> {
    let to_err = |source: std::io::Error| BuildError::Write { path: path.to_path_buf(), source };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(to_err)?;
    }
    fs::write(path, contents).map_err(to_err)
}
