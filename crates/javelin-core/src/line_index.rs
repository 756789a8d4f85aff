use crate::Span;

/// Precomputed line-start table for mapping byte offsets to 1-based line
/// numbers and back to whole-line extents.
#[derive(Clone, Debug)]
pub struct LineIndex {
    /// Byte offset of the first character of each line. Always starts with 0.
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (idx, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(idx + 1);
            }
        }
        Self {
            line_starts,
            len: text.len(),
        }
    }

    /// 1-based line number containing `offset`.
    pub fn line_of(&self, offset: usize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx + 1,
            Err(idx) => idx,
        }
    }

    /// Span of the full line (excluding the terminating newline) containing
    /// `offset`.
    pub fn line_span(&self, offset: usize) -> Span {
        let line = self.line_of(offset);
        let start = self.line_starts[line - 1];
        let end = self
            .line_starts
            .get(line)
            .map(|next| next - 1)
            .unwrap_or(self.len);
        Span::new(start, end)
    }
}
