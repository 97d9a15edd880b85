//! Conditional-block filtering.
//!
//! A two-state machine over the classified lines of a [`Template`]. Only one
//! state is tracked, so blocks cannot nest: an `#IF` inside an open block
//! simply re-decides the state for the lines that follow it, and the first
//! `#ENDIF` closes everything.

use super::{ConditionalFault, Defines, RenderError, Span, Template};
use crate::lexer::LineKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Emitting,
    Suppressed,
}

/// Spans of `template` that survive filtering, in source order. Adjacent
/// retained lines are merged into one span.
pub fn retained_spans(template: &Template, defines: &Defines) -> Result<Vec<Span>, RenderError> {
    if !template.has_conditionals() {
        return Ok(vec![Span::new(0, template.text().len())]);
    }

    let mut state = State::Emitting;
    let mut open = false;
    let mut kept: Vec<Span> = Vec::new();

    for line in template.lines() {
        match &line.kind {
            LineKind::StartConditional(flag) => {
                state = if defines.contains(flag) {
                    State::Emitting
                } else {
                    State::Suppressed
                };
                open = true;
            }
            LineKind::EndConditional => {
                if !open {
                    return Err(malformed(template, line.number, line.span, ConditionalFault::StrayEnd));
                }
                state = State::Emitting;
                open = false;
            }
            LineKind::Malformed(fault) => {
                return Err(malformed(template, line.number, line.span, fault.clone()));
            }
            LineKind::Plain => {
                if state == State::Emitting {
                    match kept.last_mut() {
                        Some(prev) if prev.end == line.span.start => prev.end = line.span.end,
                        _ => kept.push(line.span),
                    }
                }
            }
        }
    }

    Ok(kept)
}

fn malformed(template: &Template, line: usize, span: Span, fault: ConditionalFault) -> RenderError {
    let text = template.slice(span);
    let trimmed = text.trim_end_matches(['\n', '\r']);
    RenderError::MalformedConditional {
        template: template.name().to_string(),
        fault,
        line,
        span: Span::new(span.start, span.start + trimmed.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defines(flags: &[&str]) -> Defines {
        flags.iter().map(|f| f.to_string()).collect()
    }

    fn filter(doc: &str, flags: &[&str]) -> Result<String, RenderError> {
        Template::new("doc", doc).filter(&defines(flags))
    }

    #[test]
    fn markers_never_appear_in_output() {
        let out = filter("#IF A\nx\n#ENDIF\n", &["A"]).unwrap();
        assert_eq!(out, "x\n");
    }

    #[test]
    fn sequential_blocks() {
        let doc = "head\n#IF WINDOWS\nwin\n#ENDIF\nmid\n#IF LINUX\nlinux\n#ENDIF\ntail\n";
        assert_eq!(filter(doc, &["WINDOWS"]).unwrap(), "head\nwin\nmid\ntail\n");
        assert_eq!(filter(doc, &["LINUX"]).unwrap(), "head\nmid\nlinux\ntail\n");
        assert_eq!(filter(doc, &["WINDOWS", "LINUX"]).unwrap(), "head\nwin\nmid\nlinux\ntail\n");
        assert_eq!(filter(doc, &[]).unwrap(), "head\nmid\ntail\n");
    }

    #[test]
    fn unknown_flag_is_inactive() {
        let doc = "#IF SOLARIS\ngone\n#ENDIF\nstays\n";
        assert_eq!(filter(doc, &["WINDOWS"]).unwrap(), "stays\n");
    }

    #[test]
    fn flag_match_is_exact() {
        // No prefix or case-folded matches on the flag itself.
        let doc = "#IF WINDOWS\nw\n#ENDIF\n";
        assert_eq!(filter(doc, &["WIN"]).unwrap(), "");
        assert_eq!(filter(doc, &["windows"]).unwrap(), "");
    }

    #[test]
    fn marker_keywords_ignore_case() {
        let doc = "  #if WINDOWS\nw\n  #EndIf\n";
        assert_eq!(filter(doc, &["WINDOWS"]).unwrap(), "w\n");
    }

    #[test]
    fn crlf_preserved() {
        let doc = "a\r\n#IF X\r\nb\r\n#ENDIF\r\nc";
        assert_eq!(filter(doc, &["X"]).unwrap(), "a\r\nb\r\nc");
        assert_eq!(filter(doc, &[]).unwrap(), "a\r\nc");
    }

    #[test]
    fn nested_start_redecides_state() {
        // Nesting is unsupported: the inner #IF overrides the outer one and
        // the first #ENDIF closes the block.
        let doc = "#IF OUTER\na\n#IF INNER\nb\n#ENDIF\nc\n#ENDIF\n";
        let err = filter(doc, &["INNER"]).unwrap_err();
        assert_eq!(err.code(), "TPL-C001");
        assert_eq!(err.line(), 7);

        let doc = "#IF OUTER\na\n#IF INNER\nb\n#ENDIF\nc\n";
        assert_eq!(filter(doc, &["INNER"]).unwrap(), "b\nc\n");
        assert_eq!(filter(doc, &["OUTER"]).unwrap(), "a\nc\n");
    }

    #[test]
    fn unterminated_block_runs_to_end() {
        let doc = "a\n#IF X\nb\nc\n";
        assert_eq!(filter(doc, &[]).unwrap(), "a\n");
        assert_eq!(filter(doc, &["X"]).unwrap(), "a\nb\nc\n");
    }

    #[test]
    fn stray_endif_is_malformed() {
        let err = filter("a\n#ENDIF\n", &["X"]).unwrap_err();
        match err {
            RenderError::MalformedConditional { fault, line, span, template } => {
                assert_eq!(fault, ConditionalFault::StrayEnd);
                assert_eq!(line, 2);
                assert_eq!(span, Span::new(2, 8));
                assert_eq!(template, "doc");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn double_endif_is_malformed() {
        let err = filter("#IF X\na\n#ENDIF\n#ENDIF\n", &["X"]).unwrap_err();
        assert_eq!(err.line(), 4);
    }

    #[test]
    fn missing_flag_is_malformed_even_when_suppressed() {
        let err = filter("#IF X\n#IF\n#ENDIF\n", &[]).unwrap_err();
        assert_eq!(err.code(), "TPL-C002");
        assert_eq!(err.line(), 2);
    }

    #[test]
    fn malformed_marker_without_defines_still_fails() {
        let err = filter("ok\n#ENDIF now\n", &[]).unwrap_err();
        assert_eq!(err.code(), "TPL-C003");
    }

    #[test]
    fn script_if_comment_is_rejected_without_defines() {
        let doc = "Write-Host start\n#if ($env:CI) { exit }\n";
        let err = filter(doc, &[]).unwrap_err();
        assert_eq!(err.code(), "TPL-C004");
        assert_eq!(err.line(), 2);

        // A space after '#' makes it an ordinary comment.
        let doc = "Write-Host start\n# if ($env:CI) { exit }\n";
        assert_eq!(filter(doc, &[]).unwrap(), doc);
    }

    #[test]
    fn adjacent_lines_merge_into_one_span() {
        let t = Template::new("doc", "a\nb\n#IF X\nc\n#ENDIF\nd\n");
        let spans = retained_spans(&t, &defines(&[])).unwrap();
        assert_eq!(spans, vec![Span::new(0, 4), Span::new(19, 21)]);
    }

    #[test]
    fn fast_path_is_single_span() {
        let t = Template::new("doc", "a\nb\n");
        let spans = retained_spans(&t, &defines(&["X"])).unwrap();
        assert_eq!(spans, vec![Span::new(0, 4)]);
    }
}
