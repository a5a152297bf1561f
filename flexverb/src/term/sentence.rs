use std::ops::Range;
use std::slice;

use crate::term::Term;

/// A value paired with the byte span it was parsed from.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Range<usize>,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Range<usize>) -> Self {
        Spanned { node, span }
    }
}

/// The terms of one sentence.
///
/// A sentence with exactly one term is returned bare; anything longer is a
/// collection in source order. Order carries no meaning to the interpreter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sentence {
    Single(Term),
    Many(Vec<Term>),
}

impl Sentence {
    /// View the sentence as a slice, treating a bare term as one element.
    pub fn terms(&self) -> &[Term] {
        match self {
            Sentence::Single(term) => slice::from_ref(term),
            Sentence::Many(terms) => terms,
        }
    }

    /// The bare term, if this sentence holds exactly one.
    pub fn as_single(&self) -> Option<&Term> {
        match self {
            Sentence::Single(term) => Some(term),
            Sentence::Many(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.terms().len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms().is_empty()
    }
}

impl From<Term> for Sentence {
    fn from(term: Term) -> Self {
        Sentence::Single(term)
    }
}

/// Builds the collection shape. A one-element vector stays a collection so
/// callers that construct `Many` explicitly get back what they built.
impl From<Vec<Term>> for Sentence {
    fn from(terms: Vec<Term>) -> Self {
        Sentence::Many(terms)
    }
}

impl From<Vec<Spanned<Term>>> for Sentence {
    fn from(mut terms: Vec<Spanned<Term>>) -> Self {
        if terms.len() == 1 {
            let only = terms.remove(0);
            Sentence::Single(only.node)
        } else {
            Sentence::Many(terms.into_iter().map(|t| t.node).collect())
        }
    }
}

impl<'a> IntoIterator for &'a Sentence {
    type Item = &'a Term;
    type IntoIter = slice::Iter<'a, Term>;

    fn into_iter(self) -> Self::IntoIter {
        self.terms().iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_term_is_a_one_element_slice() {
        let sentence = Sentence::from(Term::verb("print"));
        assert_eq!(sentence.terms(), &[Term::verb("print")]);
        assert_eq!(sentence.len(), 1);
    }

    #[test]
    fn spanned_collapses_by_cardinality() {
        let one = vec![Spanned::new(Term::verb("print"), 0..11)];
        assert_eq!(Sentence::from(one), Sentence::Single(Term::verb("print")));

        let two = vec![
            Spanned::new(Term::verb("print"), 0..11),
            Spanned::new(Term::direct_object("\"x\""), 12..20),
        ];
        assert!(matches!(Sentence::from(two), Sentence::Many(ref t) if t.len() == 2));
    }
}
