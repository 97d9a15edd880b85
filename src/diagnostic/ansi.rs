use super::Diagnostic;
use crate::template::SourceMap;

pub struct AnsiRenderer {
    pub use_color: bool,
}

impl AnsiRenderer {
    fn bold(&self, s: &str) -> String {
        if self.use_color { format!("\x1b[1m{s}\x1b[0m") } else { s.to_string() }
    }

    fn bold_red(&self, s: &str) -> String {
        if self.use_color { format!("\x1b[1;31m{s}\x1b[0m") } else { s.to_string() }
    }

    fn cyan(&self, s: &str) -> String {
        if self.use_color { format!("\x1b[36m{s}\x1b[0m") } else { s.to_string() }
    }

    fn dim(&self, s: &str) -> String {
        if self.use_color { format!("\x1b[2m{s}\x1b[0m") } else { s.to_string() }
    }

    pub fn render(&self, d: &Diagnostic) -> String {
        let mut out = String::new();

        // "error[TPL-C001]: message"
        let head = match d.code {
            Some(code) => format!("error[{code}]"),
            None => "error".to_string(),
        };
        out.push_str(&format!("{}: {}\n", self.bold_red(&head), self.bold(&d.message)));

        let primary = d.labels.iter().find(|l| l.is_primary);
        match (primary, &d.source) {
            (Some(label), Some(source)) => {
                let map = SourceMap::new(source);
                let (line, col) = map.lookup(label.span.start);
                let line_text = map.line_text(line);

                // "  --> name:line:col"
                let origin = d.origin.as_deref().unwrap_or("<template>");
                out.push_str(&format!("  {} {}:{}:{}\n", self.cyan("-->"), origin, line, col));

                let gutter = line.to_string().len();
                let pipe = self.cyan("|");
                let pad = " ".repeat(gutter);

                out.push_str(&format!("{pad} {pipe}\n"));

                let line_num = self.cyan(&format!("{line:>gutter$}"));
                out.push_str(&format!("{line_num} {pipe} {line_text}\n"));

                // Carets never run past the end of the printed line.
                let start_in_line = col.saturating_sub(1);
                let room = line_text.chars().count().saturating_sub(start_in_line).max(1);
                let span_len = label.span.len().clamp(1, room);
                let carets = self.bold_red(&"^".repeat(span_len));
                let indent = " ".repeat(start_in_line);
                if label.message.is_empty() {
                    out.push_str(&format!("{pad} {pipe} {indent}{carets}\n"));
                } else {
                    out.push_str(&format!(
                        "{pad} {pipe} {indent}{carets} {}\n",
                        self.bold_red(&label.message)
                    ));
                }

                out.push_str(&format!("{pad} {pipe}\n"));
            }
            _ => {
                if let Some(origin) = &d.origin {
                    out.push_str(&format!("  {} {}\n", self.cyan("-->"), origin));
                }
            }
        }

        for label in d.labels.iter().filter(|l| !l.is_primary) {
            if !label.message.is_empty() {
                out.push_str(&format!("  {} {}\n", self.dim("="), label.message));
            }
        }

        for note in &d.notes {
            out.push_str(&format!("  {} note: {}\n", self.dim("="), note));
        }

        if let Some(suggestion) = &d.suggestion {
            out.push_str(&format!("  {} suggestion: {}\n", self.dim("="), suggestion));
        }

        out
    }
}
