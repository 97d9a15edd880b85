use std::ops::Range;

/// Maps byte offsets in template text to 1-based line and column numbers.
///
/// A line ends at `\n`; a `\r` right before it is part of the terminator,
/// so CRLF templates report the same positions as LF ones. Columns count
/// characters, which is what an editor shows.
pub struct SourceMap<'a> {
    text: &'a str,
    /// Byte range of each line's content, terminator excluded.
    lines: Vec<Range<usize>>,
}

impl<'a> SourceMap<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut lines = Vec::new();
        let mut start = 0;
        for raw in text.split_inclusive('\n') {
            let content = match raw.strip_suffix('\n') {
                Some(rest) => rest.strip_suffix('\r').unwrap_or(rest),
                None => raw,
            };
            lines.push(start..start + content.len());
            start += raw.len();
        }
        // Text that is empty or ends in a newline has one more (empty) line.
        if text.is_empty() || text.ends_with('\n') {
            lines.push(text.len()..text.len());
        }
        SourceMap { text, lines }
    }

    /// Returns (line, col). Offsets inside a terminator, or past the end,
    /// clamp to the end of that line's content.
    pub fn lookup(&self, offset: usize) -> (usize, usize) {
        let index = self.lines.partition_point(|r| r.start <= offset).saturating_sub(1);
        let range = &self.lines[index];
        let end = offset.min(range.end);
        let col = match self.text.get(range.start..end) {
            Some(prefix) => prefix.chars().count(),
            None => end - range.start,
        };
        (index + 1, col + 1)
    }

    /// Returns the text of the given 1-based line without its terminator.
    pub fn line_text(&self, line: usize) -> &'a str {
        line.checked_sub(1)
            .and_then(|i| self.lines.get(i))
            .and_then(|r| self.text.get(r.clone()))
            .unwrap_or("")
    }
}
