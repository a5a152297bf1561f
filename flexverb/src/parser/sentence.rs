use std::ops::Range;

use crate::parser::error::ParseError;
use crate::term::{Role, Spanned, Term};

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Parse one sentence into spanned terms, in source order.
///
/// `base_offset` is added to every span so a sentence cut out of a larger
/// file still reports positions in that file.
pub fn parse_terms(
    source: &str,
    base_offset: usize,
    file_id: usize,
) -> Result<Vec<Spanned<Term>>, ParseError> {
    let mut scanner = Scanner::new(source, base_offset, file_id);
    scanner.skip_whitespace();
    if scanner.at_end() {
        return Err(scanner
            .error("expected a term", scanner.pos..scanner.pos)
            .with_note("a sentence needs at least one `verb(...)` or `direct-object(...)` term"));
    }

    let mut terms = Vec::new();
    loop {
        terms.push(scanner.parse_term()?);
        let separated = scanner.skip_whitespace();
        if scanner.at_end() {
            break;
        }
        if scanner.peek() == Some(')') {
            return Err(scanner.error(
                "unbalanced parentheses: unexpected `)`",
                scanner.pos..scanner.pos + 1,
            ));
        }
        if !separated {
            let end = scanner.chunk_end(scanner.pos);
            return Err(scanner.error("expected whitespace between terms", scanner.pos..end));
        }
    }

    Ok(terms)
}

// ---------------------------------------------------------------------------
// Scanner: byte cursor over a single sentence
// ---------------------------------------------------------------------------

struct Scanner<'a> {
    source: &'a str,
    pos: usize,
    base_offset: usize,
    file_id: usize,
}

impl<'a> Scanner<'a> {
    fn new(source: &'a str, base_offset: usize, file_id: usize) -> Self {
        Scanner {
            source,
            pos: 0,
            base_offset,
            file_id,
        }
    }

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    /// Skip any run of whitespace. Returns true if at least one char was skipped.
    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.advance();
        }
        self.pos > start
    }

    /// Advance while `keep` holds for the next char.
    fn take_while(&mut self, keep: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(&keep) {
            self.advance();
        }
        &self.source[start..self.pos]
    }

    /// Byte offset of the next whitespace at or after `from` (or end of input).
    fn chunk_end(&self, from: usize) -> usize {
        self.source[from..]
            .find(char::is_whitespace)
            .map_or(self.source.len(), |i| from + i)
    }

    fn span(&self, local: Range<usize>) -> Range<usize> {
        local.start + self.base_offset..local.end + self.base_offset
    }

    fn error(&self, msg: impl Into<String>, local: Range<usize>) -> ParseError {
        let fragment = &self.source[local.clone()];
        ParseError::new(msg, fragment, self.span(local), self.file_id)
    }

    // -----------------------------------------------------------------------
    // Grammar
    // -----------------------------------------------------------------------

    /// term := marker "(" argument ")"
    fn parse_term(&mut self) -> Result<Spanned<Term>, ParseError> {
        let start = self.pos;
        let role = self.parse_marker()?;

        if self.peek() != Some('(') {
            let marker = &self.source[start..self.pos];
            let end = self.chunk_end(start);
            return Err(self.error(format!("expected `(` after `{}`", marker), start..end));
        }
        self.advance();

        let term = match role {
            Role::Verb => self.parse_verb_name(start)?,
            Role::DirectObject => self.parse_quoted_literal(start)?,
        };

        Ok(Spanned::new(term, self.span(start..self.pos)))
    }

    fn parse_marker(&mut self) -> Result<Role, ParseError> {
        let start = self.pos;
        let marker = self.take_while(|c| !c.is_whitespace() && !matches!(c, '(' | ')' | '"'));

        if marker.is_empty() {
            let end = self.chunk_end(start).max(start + self.peek().map_or(0, char::len_utf8));
            return Err(self.error("expected a role marker", start..end));
        }

        Role::from_marker(marker).ok_or_else(|| {
            self.error(format!("unknown role marker `{}`", marker), start..self.pos)
                .with_note("expected one of `verb`, `v`, `direct-object`, `o`")
        })
    }

    /// verb_name := one or more chars other than parentheses and whitespace, then ")"
    fn parse_verb_name(&mut self, term_start: usize) -> Result<Term, ParseError> {
        let name = self.take_while(|c| !c.is_whitespace() && !matches!(c, '(' | ')'));

        match self.peek() {
            Some(')') => {
                self.advance();
                if name.is_empty() {
                    return Err(self.error("missing verb name", term_start..self.pos));
                }
                Ok(Term::verb(name))
            }
            Some('(') => Err(self.error(
                "unbalanced parentheses: unexpected `(` in verb name",
                term_start..self.pos + 1,
            )),
            _ => Err(self.error(
                "unbalanced parentheses: missing `)` after verb name",
                term_start..self.pos,
            )),
        }
    }

    /// quoted_literal := '"' ... '"' then ")"; contents are kept verbatim
    fn parse_quoted_literal(&mut self, term_start: usize) -> Result<Term, ParseError> {
        if self.peek() != Some('"') {
            let end = self.chunk_end(term_start);
            return Err(self
                .error("expected a quoted literal", term_start..end)
                .with_note("direct objects are written as `direct-object(\"...\")`"));
        }
        let literal_start = self.pos;
        self.advance();

        let Some(close) = self.source[self.pos..].find('"') else {
            return Err(self.error("unterminated string literal", term_start..self.source.len()));
        };
        self.pos += close + 1;
        let literal = &self.source[literal_start..self.pos];

        if self.peek() != Some(')') {
            let end = self.chunk_end(self.pos).max(self.pos);
            return Err(self.error(
                "unbalanced parentheses: expected `)` after literal",
                term_start..end,
            ));
        }
        self.advance();

        Ok(Term::direct_object(literal))
    }
}
