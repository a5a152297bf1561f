pub mod error;
mod script;
mod sentence;

pub use error::ParseError;

use crate::Script;
use crate::term::{Sentence, Spanned, Term};

/// Parser entry point.
pub struct Parser {
    source: String,
    file_id: usize,
    offset: usize,
}

impl Parser {
    pub fn new(source: impl Into<String>, file_id: usize) -> Self {
        Parser {
            source: source.into(),
            file_id,
            offset: 0,
        }
    }

    /// Shift every reported span by `offset` bytes.
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Parse the source as a single sentence.
    ///
    /// One term comes back bare as [`Sentence::Single`]; two or more come
    /// back as [`Sentence::Many`] in source order.
    pub fn parse(&self) -> Result<Sentence, ParseError> {
        self.parse_spanned().map(Sentence::from)
    }

    /// Parse the source as a single sentence, keeping each term's span.
    pub fn parse_spanned(&self) -> Result<Vec<Spanned<Term>>, ParseError> {
        sentence::parse_terms(&self.source, self.offset, self.file_id)
    }

    /// Parse the source as a script of one sentence per line.
    pub fn parse_script(&self) -> Result<Script, Vec<ParseError>> {
        let statements = script::parse_statements(&self.source, self.offset, self.file_id)?;
        Ok(Script {
            statements,
            source_id: self.file_id,
        })
    }
}

/// Parse a standalone sentence.
pub fn parse(text: &str) -> Result<Sentence, ParseError> {
    Parser::new(text, 0).parse()
}
