use crate::{Diagnostic, LineIndex, Severity, Span};

const DELIMITER: &str = "----------\n";

struct Unit {
    file: String,
    source: String,
    index: LineIndex,
}

/// Collects positioned diagnostics and renders the canonical transcript.
///
/// Diagnostics for one compilation unit are emitted in source order;
/// diagnostics across units are grouped per file in the order the units were
/// registered, each group wrapped in `----------` delimiter lines. Numbering
/// restarts at 1 for every file group.
#[derive(Default)]
pub struct DiagnosticReporter {
    units: Vec<Unit>,
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a compilation unit. Units render in registration order.
    pub fn add_unit(&mut self, file: impl Into<String>, source: impl Into<String>) {
        let source = source.into();
        let index = LineIndex::new(&source);
        self.units.push(Unit {
            file: file.into(),
            source,
            index,
        });
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn error(&mut self, file: impl Into<String>, span: Span, message: impl Into<String>) {
        self.report(Diagnostic::error(file, span, message));
    }

    pub fn warning(&mut self, file: impl Into<String>, span: Span, message: impl Into<String>) {
        self.report(Diagnostic::warning(file, span, message));
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Render the full multi-file transcript.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for unit in &self.units {
            let mut group: Vec<&Diagnostic> = self
                .diagnostics
                .iter()
                .filter(|d| d.file == unit.file)
                .collect();
            if group.is_empty() {
                continue;
            }
            group.sort_by_key(|d| d.span.start);

            out.push_str(DELIMITER);
            for (n, diagnostic) in group.iter().enumerate() {
                render_one(&mut out, unit, n + 1, diagnostic);
                out.push_str(DELIMITER);
            }
        }
        out
    }
}

fn render_one(out: &mut String, unit: &Unit, number: usize, diagnostic: &Diagnostic) {
    let line = unit.index.line_of(diagnostic.span.start);
    out.push_str(&format!(
        "{}. {} in {} (at line {})\n",
        number,
        diagnostic.severity.keyword(),
        unit.file,
        line
    ));

    let line_span = unit.index.line_span(diagnostic.span.start);
    let line_text = &unit.source[line_span.start..line_span.end];
    let trimmed = line_text.trim_start();
    let trim_offset = line_span.start + (line_text.len() - trimmed.len());

    out.push('\t');
    out.push_str(trimmed);
    out.push('\n');

    out.push('\t');
    out.push_str(&underline(unit, trim_offset, line_span.end, diagnostic.span));
    out.push('\n');

    out.push_str(&diagnostic.message);
    out.push('\n');
}

/// Build the caret line: whitespace is preserved, every other character
/// before the span becomes a space, the span itself becomes carets.
fn underline(unit: &Unit, trim_offset: usize, line_end: usize, span: Span) -> String {
    let start = span.start.max(trim_offset);
    let end = span.end.min(line_end).max(start);

    let mut carets = String::new();
    for ch in unit.source[trim_offset..start].chars() {
        carets.push(if ch == '\t' { '\t' } else { ' ' });
    }
    let width = unit.source[start..end].chars().count().max(1);
    for _ in 0..width {
        carets.push('^');
    }
    carets
}
