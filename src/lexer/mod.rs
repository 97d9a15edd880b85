use std::sync::LazyLock;

use logos::Logos;
use regex::Regex;

use crate::template::ConditionalFault;

// Keywords are case-insensitive; `\b` keeps `#ifdef` and `#endif_x` out.
static IF_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*#if\b(.*)$").expect("IF_LINE is a valid regex"));
static ENDIF_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*#endif\b(.*)$").expect("ENDIF_LINE is a valid regex"));
static FLAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("FLAG is a valid regex"));

/// What a single template line means to the conditional filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    Plain,
    StartConditional(String),
    EndConditional,
    Malformed(ConditionalFault),
}

/// Classify one line. A trailing `\n` or `\r\n` is ignored.
pub fn classify(line: &str) -> LineKind {
    let line = line.trim_end_matches('\n').trim_end_matches('\r');

    if let Some(caps) = ENDIF_LINE.captures(line) {
        let rest = caps[1].trim();
        return if rest.is_empty() {
            LineKind::EndConditional
        } else {
            LineKind::Malformed(ConditionalFault::EndWithArgument(rest.to_string()))
        };
    }

    if let Some(caps) = IF_LINE.captures(line) {
        let raw = &caps[1];
        let flag = raw.trim();
        if flag.is_empty() {
            return LineKind::Malformed(ConditionalFault::MissingFlag);
        }
        // `#if(FOO)` or `#if-foo`: the flag must be separated by whitespace.
        if !raw.starts_with(char::is_whitespace) || !FLAG.is_match(flag) {
            return LineKind::Malformed(ConditionalFault::InvalidFlag(flag.to_string()));
        }
        return LineKind::StartConditional(flag.to_string());
    }

    LineKind::Plain
}

/// Pieces of text as seen by placeholder substitution.
#[derive(Logos, Debug, PartialEq, Clone, Copy)]
pub enum Piece {
    // `{%Name%}` where Name is ASCII alphanumeric
    #[regex(r"\{%[A-Za-z0-9]+%\}")]
    Placeholder,

    #[regex(r"[^{]+")]
    Text,

    // A lone brace, or the start of something that only resembles a placeholder
    #[token("{")]
    Brace,
}

/// Strip the `{%` / `%}` delimiters from a placeholder slice.
pub fn placeholder_name(slice: &str) -> &str {
    slice
        .strip_prefix("{%")
        .and_then(|s| s.strip_suffix("%}"))
        .unwrap_or(slice)
}

/// Lex `text` into pieces with their byte ranges. Every input byte belongs to
/// exactly one piece.
pub fn pieces(text: &str) -> Vec<(Piece, std::ops::Range<usize>)> {
    let mut lexer = Piece::lexer(text);
    let mut out = Vec::new();
    while let Some(result) = lexer.next() {
        // No input is rejected by these patterns; fall back to literal text anyway.
        let piece = result.unwrap_or(Piece::Text);
        out.push((piece, lexer.span()));
    }
    out
}
