use flexverb::{Role, Script, Sentence, Statement, Term};

use crate::action::ActionHandler;
use crate::error::{DiagnosticError, RuntimeError};
use crate::registry::{ActionId, ActionRegistry};
use crate::transform::{Transform, Value};

/// A fully resolved sentence, ready to hand to an [`ActionHandler`].
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub action: ActionId,
    pub argument: Option<String>,
}

/// Terms of one sentence, keyed by role.
#[derive(Debug, Default)]
struct RoleRecord<'t> {
    verb: Option<&'t Term>,
    direct_object: Option<&'t Term>,
}

impl<'t> RoleRecord<'t> {
    fn classify(terms: &'t [Term]) -> Result<Self, RuntimeError> {
        let mut record = RoleRecord::default();
        for term in terms {
            let slot = match term {
                Term::Verb { .. } => &mut record.verb,
                Term::DirectObject { .. } => &mut record.direct_object,
            };
            if slot.replace(term).is_some() {
                return Err(RuntimeError::DuplicateRole(term.role()));
            }
        }
        Ok(record)
    }
}

/// Executes sentences against a fixed action registry.
///
/// The result never depends on the order of the terms: they are sorted into
/// a [`RoleRecord`] first and only then resolved.
#[derive(Debug, Clone, Copy)]
pub struct Interpreter<'r> {
    registry: &'r ActionRegistry,
}

impl<'r> Interpreter<'r> {
    pub fn new(registry: &'r ActionRegistry) -> Self {
        Interpreter { registry }
    }

    /// Resolve a sentence without performing it.
    ///
    /// Accepts a bare [`Term`], a `Vec<Term>`, or a parsed [`Sentence`].
    pub fn resolve(&self, sentence: impl Into<Sentence>) -> Result<Invocation, RuntimeError> {
        self.resolve_terms(sentence.into().terms())
    }

    /// Resolve a sentence and perform it through `handler`.
    ///
    /// `handler` is called exactly once on success and not at all on error.
    pub fn interpret(
        &self,
        sentence: impl Into<Sentence>,
        handler: &mut dyn ActionHandler,
    ) -> Result<(), RuntimeError> {
        let invocation = self.resolve(sentence)?;
        handler.invoke(&invocation.action, invocation.argument.as_deref())
    }

    fn resolve_terms(&self, terms: &[Term]) -> Result<Invocation, RuntimeError> {
        let record = RoleRecord::classify(terms)?;
        let verb = record.verb.ok_or(RuntimeError::MissingVerb)?;

        let transform = Transform::new(self.registry);
        let mut action = None;
        let mut argument = None;
        for term in std::iter::once(verb).chain(record.direct_object) {
            match transform.apply(term)? {
                Value::Action(id) => action = Some(id),
                Value::Argument(text) => argument = Some(text),
            }
        }

        let action = action.ok_or(RuntimeError::MissingVerb)?;
        Ok(Invocation { action, argument })
    }
}

/// Resolve every statement of a script without performing any of them.
pub fn check_script(
    script: &Script,
    registry: &ActionRegistry,
) -> Result<Vec<Invocation>, DiagnosticError> {
    let interpreter = Interpreter::new(registry);
    script
        .statements
        .iter()
        .map(|statement| {
            interpreter
                .resolve(statement.sentence())
                .map_err(|e| locate(e, statement, script.source_id))
        })
        .collect()
}

/// Perform a script's statements in order, stopping at the first failure.
/// Returns the number of statements performed.
pub fn execute_script(
    script: &Script,
    registry: &ActionRegistry,
    handler: &mut dyn ActionHandler,
) -> Result<usize, DiagnosticError> {
    let interpreter = Interpreter::new(registry);
    for statement in &script.statements {
        interpreter
            .interpret(statement.sentence(), handler)
            .map_err(|e| locate(e, statement, script.source_id))?;
    }
    Ok(script.statements.len())
}

/// Attach the most specific span available for `error` within `statement`.
fn locate(error: RuntimeError, statement: &Statement, source_id: usize) -> DiagnosticError {
    let span = match &error {
        RuntimeError::UnknownVerb(_) | RuntimeError::UnsupportedAction(_) => {
            statement.span_of(Role::Verb)
        }
        RuntimeError::DuplicateRole(role) => statement
            .terms
            .iter()
            .filter(|t| t.node.role() == *role)
            .nth(1)
            .map(|t| t.span.clone()),
        _ => None,
    };
    DiagnosticError::new(error, span.unwrap_or_else(|| statement.span.clone()), source_id)
}
