use std::fmt;
use std::ops::Range;

use codespan_reporting::diagnostic::{Diagnostic, Label};
use flexverb::Role;

use crate::registry::ActionId;

#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeError {
    /// The verb is not in the action registry.
    UnknownVerb(String),
    /// The sentence has no verb term.
    MissingVerb,
    /// The sentence has more than one term of the same role.
    DuplicateRole(Role),
    /// The action handler has no implementation for a resolved action.
    UnsupportedAction(ActionId),
    IoError(String),
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::UnknownVerb(name) => write!(f, "unknown verb: {}", name),
            RuntimeError::MissingVerb => write!(f, "missing verb: sentence has no verb term"),
            RuntimeError::DuplicateRole(role) => {
                write!(f, "duplicate role: more than one {} term", role)
            }
            RuntimeError::UnsupportedAction(action) => {
                write!(f, "unsupported action: {}", action)
            }
            RuntimeError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for RuntimeError {}

impl From<std::io::Error> for RuntimeError {
    fn from(error: std::io::Error) -> Self {
        RuntimeError::IoError(error.to_string())
    }
}

/// A runtime error located within a script.
#[derive(Debug)]
pub struct DiagnosticError {
    pub error: RuntimeError,
    pub span: Range<usize>,
    pub source_id: usize,
}

impl DiagnosticError {
    pub fn new(error: RuntimeError, span: Range<usize>, source_id: usize) -> Self {
        DiagnosticError {
            error,
            span,
            source_id,
        }
    }

    /// Convert to a codespan-reporting Diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic<usize> {
        Diagnostic::error()
            .with_message(self.error.to_string())
            .with_labels(vec![Label::primary(self.source_id, self.span.clone())])
    }
}

impl fmt::Display for DiagnosticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.error.fmt(f)
    }
}

impl std::error::Error for DiagnosticError {}
