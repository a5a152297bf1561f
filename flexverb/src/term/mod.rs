pub mod sentence;

use std::fmt;

pub use sentence::{Sentence, Spanned};

/// The grammatical role a term plays in a sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Verb,
    DirectObject,
}

impl Role {
    /// The full marker that introduces a term of this role.
    pub fn marker(&self) -> &'static str {
        match self {
            Role::Verb => "verb",
            Role::DirectObject => "direct-object",
        }
    }

    /// The single-letter marker that introduces a term of this role.
    pub fn terse_marker(&self) -> &'static str {
        match self {
            Role::Verb => "v",
            Role::DirectObject => "o",
        }
    }

    /// Look up a role by either of its markers. Markers are case-sensitive.
    pub fn from_marker(marker: &str) -> Option<Role> {
        match marker {
            "verb" | "v" => Some(Role::Verb),
            "direct-object" | "o" => Some(Role::DirectObject),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker())
    }
}

/// A single tagged term, exactly as written in the source.
///
/// Terms hold raw text only. A verb name has not been looked up yet, and a
/// direct-object literal still has its surrounding quotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    Verb { name: String },
    DirectObject { literal: String },
}

impl Term {
    pub fn verb(name: impl Into<String>) -> Self {
        Term::Verb { name: name.into() }
    }

    pub fn direct_object(literal: impl Into<String>) -> Self {
        Term::DirectObject {
            literal: literal.into(),
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Term::Verb { .. } => Role::Verb,
            Term::DirectObject { .. } => Role::DirectObject,
        }
    }

    /// The raw text carried by the term.
    pub fn text(&self) -> &str {
        match self {
            Term::Verb { name } => name,
            Term::DirectObject { literal } => literal,
        }
    }
}

/// Renders the term in full-marker notation, e.g. `direct-object("hi")`.
impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.role().marker(), self.text())
    }
}
