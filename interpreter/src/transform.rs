use flexverb::Term;

use crate::error::RuntimeError;
use crate::registry::{ActionId, ActionRegistry};

/// The semantic value of a single term.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A verb, resolved to its canonical action.
    Action(ActionId),
    /// A direct object, with its quote delimiters removed.
    Argument(String),
}

/// Resolves one term at a time, independent of where it sat in a sentence.
///
/// Pure: looks up verbs and decodes literals, nothing else.
#[derive(Debug, Clone, Copy)]
pub struct Transform<'r> {
    registry: &'r ActionRegistry,
}

impl<'r> Transform<'r> {
    pub fn new(registry: &'r ActionRegistry) -> Self {
        Transform { registry }
    }

    pub fn apply(&self, term: &Term) -> Result<Value, RuntimeError> {
        match term {
            Term::Verb { name } => self.resolve_action(name).map(Value::Action),
            Term::DirectObject { literal } => {
                Ok(Value::Argument(decode_literal(literal).to_string()))
            }
        }
    }

    pub fn resolve_action(&self, verb: &str) -> Result<ActionId, RuntimeError> {
        self.registry
            .resolve(verb)
            .cloned()
            .ok_or_else(|| RuntimeError::UnknownVerb(verb.to_string()))
    }
}

/// Strip one leading and one trailing `"`, each only if present.
///
/// No escape processing is done. Meant to run once, on parser output: a
/// second pass over an already decoded literal may strip real content.
pub fn decode_literal(literal: &str) -> &str {
    let inner = literal.strip_prefix('"').unwrap_or(literal);
    inner.strip_suffix('"').unwrap_or(inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transforms_a_direct_object() {
        let registry = ActionRegistry::default();
        let xform = Transform::new(&registry);
        assert_eq!(
            xform.apply(&Term::direct_object("\"hello world\"")),
            Ok(Value::Argument("hello world".to_string()))
        );
    }

    #[test]
    fn transforms_a_verb() {
        let registry = ActionRegistry::default();
        let xform = Transform::new(&registry);
        assert_eq!(
            xform.apply(&Term::verb("print")),
            Ok(Value::Action(ActionId::OUTPUT))
        );
    }

    #[test]
    fn unknown_verb() {
        let registry = ActionRegistry::default();
        let xform = Transform::new(&registry);
        assert_eq!(
            xform.apply(&Term::verb("shout")),
            Err(RuntimeError::UnknownVerb("shout".to_string()))
        );
    }

    #[test]
    fn decode_strips_exactly_one_quote_per_side() {
        assert_eq!(decode_literal("\"\"quoted\"\""), "\"quoted\"");
        assert_eq!(decode_literal("\"\""), "");
        assert_eq!(decode_literal("\""), "");
    }

    #[test]
    fn decode_keeps_escapes_verbatim() {
        assert_eq!(decode_literal(r#""tab\there""#), r"tab\there");
    }

    #[test]
    fn decode_passes_unquoted_text_through() {
        assert_eq!(decode_literal("hello world"), "hello world");
        assert_eq!(decode_literal(decode_literal("\"hello\"")), "hello");
    }
}
