//! Shared types used across Javelin crates.
//!
//! This crate holds the pieces every engine entry point needs: source spans,
//! line/offset mapping, positioned diagnostics with the canonical transcript
//! rendering, and the explicit compiler-options value that replaces any
//! ambient global configuration.

mod line_index;
mod options;
mod transcript;

pub use crate::line_index::LineIndex;
pub use crate::options::{CompilerOptions, SourceLevel, Toggle, UnusedTypeParameter};
pub use crate::transcript::DiagnosticReporter;

use std::fmt;

use serde::{Deserialize, Serialize};

/// A byte-span into a source string.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Span({}..{})", self.start, self.end)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    /// The keyword used in the diagnostic transcript.
    pub fn keyword(self) -> &'static str {
        match self {
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
        }
    }
}

/// A positioned diagnostic against one compilation unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub file: String,
    pub span: Span,
    pub message: String,
}

impl Diagnostic {
    pub fn error(file: impl Into<String>, span: Span, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            file: file.into(),
            span,
            message: message.into(),
        }
    }

    pub fn warning(file: impl Into<String>, span: Span, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            file: file.into(),
            span,
            message: message.into(),
        }
    }
}
