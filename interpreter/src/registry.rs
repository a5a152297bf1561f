use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

/// Canonical identifier of an action the host knows how to perform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionId(Cow<'static, str>);

impl ActionId {
    /// Emit the argument to standard output.
    pub const OUTPUT: ActionId = ActionId(Cow::Borrowed("output"));

    pub fn new(name: impl Into<String>) -> Self {
        ActionId(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fixed mapping from verb names to canonical actions.
///
/// Built once by the host and shared by reference with every
/// [`Transform`](crate::Transform) and [`Interpreter`](crate::Interpreter).
/// There is no way to mutate a registry after it is built.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRegistry {
    verbs: BTreeMap<String, ActionId>,
}

impl ActionRegistry {
    pub fn new<I, S>(verbs: I) -> Self
    where
        I: IntoIterator<Item = (S, ActionId)>,
        S: Into<String>,
    {
        ActionRegistry {
            verbs: verbs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Exact, case-sensitive lookup.
    pub fn resolve(&self, verb: &str) -> Option<&ActionId> {
        self.verbs.get(verb)
    }

    pub fn contains(&self, verb: &str) -> bool {
        self.verbs.contains_key(verb)
    }

    /// All registered verbs, sorted by name.
    pub fn verbs(&self) -> impl Iterator<Item = (&str, &ActionId)> {
        self.verbs.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.verbs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verbs.is_empty()
    }
}

/// `print` mapped to [`ActionId::OUTPUT`].
impl Default for ActionRegistry {
    fn default() -> Self {
        ActionRegistry::builder()
            .verb("print", ActionId::OUTPUT)
            .build()
    }
}

impl<S: Into<String>> FromIterator<(S, ActionId)> for ActionRegistry {
    fn from_iter<I: IntoIterator<Item = (S, ActionId)>>(iter: I) -> Self {
        ActionRegistry::new(iter)
    }
}

/// Accumulates verbs before freezing them into an [`ActionRegistry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    verbs: BTreeMap<String, ActionId>,
}

impl RegistryBuilder {
    /// Register `name`. A later registration of the same name wins.
    pub fn verb(mut self, name: impl Into<String>, action: ActionId) -> Self {
        self.verbs.insert(name.into(), action);
        self
    }

    pub fn build(self) -> ActionRegistry {
        ActionRegistry { verbs: self.verbs }
    }
}
