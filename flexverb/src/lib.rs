pub mod parser;
pub mod term;

use std::ops::Range;

pub use parser::{ParseError, Parser, parse};
pub use term::{Role, Sentence, Spanned, Term};

/// A parsed flexverb script: one sentence per non-blank line.
#[derive(Debug, Clone)]
pub struct Script {
    pub statements: Vec<Statement>,
    /// The source file ID (for error reporting with codespan-reporting).
    pub source_id: usize,
}

/// A single sentence of a script.
#[derive(Debug, Clone)]
pub struct Statement {
    /// Terms in source order, with their spans.
    pub terms: Vec<Spanned<Term>>,
    /// Byte span of the whole line, excluding the line terminator.
    pub span: Range<usize>,
    /// 1-based line number.
    pub line: usize,
}

impl Statement {
    /// The statement's terms in the parser's public shape.
    pub fn sentence(&self) -> Sentence {
        Sentence::from(self.terms.clone())
    }

    /// Span of the first term playing `role`, if any.
    pub fn span_of(&self, role: Role) -> Option<Range<usize>> {
        self.terms
            .iter()
            .find(|t| t.node.role() == role)
            .map(|t| t.span.clone())
    }
}
