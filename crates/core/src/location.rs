//! Source location metadata threaded through tokens, operations and errors.
//!
//! Mirrors the `meta` dictionaries the external parser attaches to every
//! token: a filename plus a half-open line (and optional column) range.

use std::fmt;
use std::rc::Rc;

/// A span of source text, used for diagnostics and tooling (LSP-style
/// zero-indexed lines, inclusive end).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceSpan {
    pub file: Option<Rc<str>>,
    pub start_line: u32,
    pub end_line: u32,
    pub start_column: Option<u32>,
    pub end_column: Option<u32>,
}

impl SourceSpan {
    pub fn new(file: impl Into<Rc<str>>, line: u32) -> Self {
        SourceSpan {
            file: Some(file.into()),
            start_line: line,
            end_line: line,
            start_column: None,
            end_column: None,
        }
    }

    pub fn span(file: impl Into<Rc<str>>, start_line: u32, end_line: u32) -> Self {
        SourceSpan {
            file: Some(file.into()),
            start_line,
            end_line,
            start_column: None,
            end_column: None,
        }
    }

    /// Widen this span so it covers `other` too. Used while a body is
    /// being linked: the enclosing definition's span grows to the union
    /// of every token's span.
    pub fn extend(&mut self, other: &SourceSpan) {
        if self.file.is_none() {
            self.file = other.file.clone();
        }
        self.start_line = self.start_line.min(other.start_line);
        self.end_line = self.end_line.max(other.end_line);
    }
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = self.file.as_deref().unwrap_or("<unknown>");
        if self.start_line == self.end_line {
            write!(f, "{file}:{}", self.start_line + 1)
        } else {
            write!(f, "{file}:{}-{}", self.start_line + 1, self.end_line + 1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extend_widens_to_cover_both_spans() {
        let mut span = SourceSpan::span("a.joy", 2, 4);
        span.extend(&SourceSpan::span("a.joy", 1, 3));
        assert_eq!(span.start_line, 1);
        assert_eq!(span.end_line, 4);
    }

    #[test]
    fn extend_adopts_file_when_missing() {
        let mut span = SourceSpan::default();
        span.extend(&SourceSpan::new("b.joy", 5));
        assert_eq!(span.file.as_deref(), Some("b.joy"));
    }

    #[test]
    fn display_collapses_single_line_span() {
        let span = SourceSpan::new("a.joy", 0);
        assert_eq!(span.to_string(), "a.joy:1");
    }
}
