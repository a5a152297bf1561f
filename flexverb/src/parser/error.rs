use std::fmt;
use std::ops::Range;

use codespan_reporting::diagnostic::{Diagnostic, Label};

/// A malformed sentence, with the offending fragment and where it sits.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    /// The source text the parser rejected.
    pub fragment: String,
    pub span: Range<usize>,
    pub file_id: usize,
    pub notes: Vec<String>,
}

impl ParseError {
    pub fn new(
        message: impl Into<String>,
        fragment: impl Into<String>,
        span: Range<usize>,
        file_id: usize,
    ) -> Self {
        ParseError {
            message: message.into(),
            fragment: fragment.into(),
            span,
            file_id,
            notes: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Convert to a codespan-reporting Diagnostic for display.
    pub fn to_diagnostic(&self) -> Diagnostic<usize> {
        Diagnostic::error()
            .with_message(&self.message)
            .with_labels(vec![Label::primary(self.file_id, self.span.clone())])
            .with_notes(self.notes.clone())
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fragment.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{} at `{}`", self.message, self.fragment)
        }
    }
}

impl std::error::Error for ParseError {}
