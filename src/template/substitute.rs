use super::{PlaceholderMap, RenderError, SourceMap, Span};
use crate::lexer::{self, Piece};

/// Replace every `{%Name%}` in `text` with its value from `values`.
///
/// Single pass: replacement values are copied into the output and never
/// re-scanned, so a value containing `{%Other%}` is emitted literally.
pub fn substitute(name: &str, text: &str, values: &PlaceholderMap) -> Result<String, RenderError> {
    substitute_spans(name, text, &[Span::new(0, text.len())], values)
}

/// Substitute within the given spans of `text`, concatenating the results.
/// Error locations are reported against `text` itself.
pub fn substitute_spans(
    name: &str,
    text: &str,
    spans: &[Span],
    values: &PlaceholderMap,
) -> Result<String, RenderError> {
    let mut out = String::with_capacity(spans.iter().map(Span::len).sum());

    for span in spans {
        let segment = &text[span.start..span.end];
        for (piece, range) in lexer::pieces(segment) {
            let slice = &segment[range.clone()];
            match piece {
                Piece::Placeholder => {
                    let key = lexer::placeholder_name(slice);
                    match values.get(key) {
                        Some(value) => out.push_str(value),
                        None => {
                            let at = Span::new(span.start + range.start, span.start + range.end);
                            return Err(missing(name, text, key, at));
                        }
                    }
                }
                Piece::Text | Piece::Brace => out.push_str(slice),
            }
        }
    }

    Ok(out)
}

fn missing(template: &str, text: &str, key: &str, span: Span) -> RenderError {
    let (line, column) = SourceMap::new(text).lookup(span.start);
    RenderError::MissingPlaceholderValue {
        template: template.to_string(),
        name: key.to_string(),
        line,
        column,
        span,
    }
}
