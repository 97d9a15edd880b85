pub mod ansi;
pub mod json;
pub mod registry;

use crate::build::BuildError;
use crate::manifest::ManifestError;
use crate::template::{ConditionalFault, RenderError, Span};

#[derive(Debug, Clone)]
pub struct Label {
    pub span: Span,
    pub message: String,
    pub is_primary: bool,
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub code: Option<&'static str>,
    pub message: String,
    pub labels: Vec<Label>,
    pub notes: Vec<String>,
    pub suggestion: Option<String>,
    /// Display name of the template the labels point into.
    pub origin: Option<String>,
    /// Full template text, needed to print source snippets.
    pub source: Option<String>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            code: None,
            message: message.into(),
            labels: Vec::new(),
            notes: Vec::new(),
            suggestion: None,
            origin: None,
            source: None,
        }
    }

    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_span(mut self, span: Span, label: impl Into<String>) -> Self {
        self.labels.push(Label { span, message: label.into(), is_primary: true });
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

// ---- From impls for error types ----

impl From<&RenderError> for Diagnostic {
    fn from(e: &RenderError) -> Self {
        let d = match e {
            RenderError::MissingPlaceholderValue { name, span, .. } => {
                Diagnostic::error(format!("no value supplied for placeholder '{name}'"))
                    .with_span(*span, "used here")
                    .with_suggestion(format!(
                        "add `{name}` to the manifest's [values] table or pass --set {name}=VALUE"
                    ))
            }
            RenderError::MalformedConditional { fault, span, .. } => {
                let d = Diagnostic::error(fault.to_string()).with_span(*span, "here");
                match fault {
                    ConditionalFault::StrayEnd => {
                        d.with_suggestion("remove this line or open the block with `#IF FLAG` above it")
                    }
                    ConditionalFault::MissingFlag => d.with_suggestion("name the flag: `#IF WINDOWS`"),
                    ConditionalFault::InvalidFlag(_) => d
                        .with_note("flags are a single word of letters, digits and underscores")
                        .with_note("conditional blocks cannot be combined or nested"),
                    ConditionalFault::EndWithArgument(_) => {
                        d.with_suggestion("write a bare `#ENDIF`")
                    }
                }
            }
        };
        d.with_code(e.code()).with_origin(e.template())
    }
}

impl From<&ManifestError> for Diagnostic {
    fn from(e: &ManifestError) -> Self {
        let mut d = Diagnostic::error(e.to_string()).with_code(e.code());
        if let ManifestError::Parse { path, .. } = e {
            d = d.with_note(format!("while loading {}", path.display()));
        }
        if let ManifestError::MissingEnv { var, .. } = e {
            d = d.with_suggestion(format!("export {var} or give the value a `default`"));
        }
        d
    }
}

impl From<&BuildError> for Diagnostic {
    fn from(e: &BuildError) -> Self {
        match e {
            BuildError::Render(inner) => Diagnostic::from(inner),
            BuildError::Manifest(inner) => Diagnostic::from(inner),
            BuildError::Read { .. } | BuildError::Write { .. } => {
                Diagnostic::error(e.to_string()).with_code(e.code())
            }
        }
    }
}
