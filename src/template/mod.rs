use std::collections::{BTreeMap, BTreeSet};

use crate::lexer::{self, LineKind};

pub mod filter;
pub mod source_map;
pub mod substitute;

pub use source_map::SourceMap;

// ---- Span infrastructure ----

/// Byte range within template text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Flags that decide which `#IF` blocks survive filtering.
pub type Defines = BTreeSet<String>;

/// Placeholder name to replacement text.
pub type PlaceholderMap = BTreeMap<String, String>;

/// One source line, terminator included.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    /// 1-based.
    pub number: usize,
    pub span: Span,
    pub kind: LineKind,
}

/// An immutable template document, classified line by line at construction.
///
/// Rendering borrows the template and returns a fresh `String`, so a single
/// `Template` can be rendered from several threads with different defines.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    text: String,
    lines: Vec<Line>,
    has_markers: bool,
}

impl Template {
    /// `name` identifies the document in error messages, usually its path.
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        let mut lines = Vec::new();
        let mut offset = 0;
        for (i, raw) in text.split_inclusive('\n').enumerate() {
            let span = Span::new(offset, offset + raw.len());
            offset = span.end;
            lines.push(Line {
                number: i + 1,
                span,
                kind: lexer::classify(raw),
            });
        }
        let has_markers = lines.iter().any(|l| l.kind != LineKind::Plain);
        Template {
            name: name.into(),
            text,
            lines,
            has_markers,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// False when no line looks like a conditional marker; such templates
    /// render verbatim without being reassembled line by line.
    pub fn has_conditionals(&self) -> bool {
        self.has_markers
    }

    pub fn slice(&self, span: Span) -> &str {
        &self.text[span.start..span.end]
    }

    /// Conditional-block filtering only.
    pub fn filter(&self, defines: &Defines) -> Result<String, RenderError> {
        let kept = filter::retained_spans(self, defines)?;
        Ok(kept.iter().map(|s| self.slice(*s)).collect())
    }

    /// Filtering followed by placeholder substitution. Either the whole
    /// document renders or an error is returned; there is no partial output.
    pub fn render(&self, defines: &Defines, values: &PlaceholderMap) -> Result<String, RenderError> {
        let kept = filter::retained_spans(self, defines)?;
        substitute::substitute_spans(&self.name, &self.text, &kept, values)
    }
}

/// Render `text` in one call. See [`Template::render`].
pub fn render(
    name: &str,
    text: &str,
    defines: &Defines,
    values: &PlaceholderMap,
) -> Result<String, RenderError> {
    Template::new(name, text).render(defines, values)
}

// ---- Errors ----

/// Why a conditional marker was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConditionalFault {
    #[error("#ENDIF without a preceding #IF")]
    StrayEnd,
    #[error("#IF is missing a flag name")]
    MissingFlag,
    #[error("#IF flag '{0}' is not an identifier")]
    InvalidFlag(String),
    #[error("#ENDIF takes no argument, found '{0}'")]
    EndWithArgument(String),
}

impl ConditionalFault {
    pub fn code(&self) -> &'static str {
        match self {
            ConditionalFault::StrayEnd => "TPL-C001",
            ConditionalFault::MissingFlag => "TPL-C002",
            ConditionalFault::EndWithArgument(_) => "TPL-C003",
            ConditionalFault::InvalidFlag(_) => "TPL-C004",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("{template}:{line}:{column}: no value supplied for placeholder '{{%{name}%}}'")]
    MissingPlaceholderValue {
        template: String,
        name: String,
        line: usize,
        column: usize,
        span: Span,
    },
    #[error("{template}:{line}: {fault}")]
    MalformedConditional {
        template: String,
        fault: ConditionalFault,
        line: usize,
        span: Span,
    },
}

impl RenderError {
    pub fn code(&self) -> &'static str {
        match self {
            RenderError::MissingPlaceholderValue { .. } => "TPL-S001",
            RenderError::MalformedConditional { fault, .. } => fault.code(),
        }
    }

    pub fn template(&self) -> &str {
        match self {
            RenderError::MissingPlaceholderValue { template, .. }
            | RenderError::MalformedConditional { template, .. } => template,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            RenderError::MissingPlaceholderValue { span, .. }
            | RenderError::MalformedConditional { span, .. } => *span,
        }
    }

    pub fn line(&self) -> usize {
        match self {
            RenderError::MissingPlaceholderValue { line, .. }
            | RenderError::MalformedConditional { line, .. } => *line,
        }
    }
}
