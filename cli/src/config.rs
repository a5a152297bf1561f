use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::Deserialize;

use flexverb_interpreter::{ActionId, ActionRegistry};

/// Verb registry as written in a TOML file:
///
/// ```toml
/// [verbs]
/// print = "output"
/// say = "output"
/// ```
///
/// A loaded file replaces the built-in registry rather than extending it.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    /// Verb name → canonical action identifier.
    #[serde(default)]
    pub verbs: BTreeMap<String, String>,
}

#[derive(Debug)]
pub enum ConfigError {
    Read { path: String, message: String },
    Toml(String),
    /// The verb could never be written in a sentence.
    InvalidVerb(String),
    EmptyAction { verb: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, message } => write!(f, "cannot read '{}': {}", path, message),
            ConfigError::Toml(msg) => write!(f, "TOML parse error: {}", msg),
            ConfigError::InvalidVerb(verb) => write!(
                f,
                "invalid verb name {:?}: must be non-empty with no whitespace or parentheses",
                verb
            ),
            ConfigError::EmptyAction { verb } => write!(f, "verb '{}' maps to an empty action", verb),
        }
    }
}

impl std::error::Error for ConfigError {}

impl RegistryConfig {
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|e| ConfigError::Toml(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml(&source)
    }

    /// Validate every entry and freeze the result.
    pub fn into_registry(self) -> Result<ActionRegistry, ConfigError> {
        let mut builder = ActionRegistry::builder();
        for (verb, action) in self.verbs {
            if !is_valid_verb(&verb) {
                return Err(ConfigError::InvalidVerb(verb));
            }
            if action.trim().is_empty() {
                return Err(ConfigError::EmptyAction { verb });
            }
            builder = builder.verb(verb, ActionId::new(action));
        }
        Ok(builder.build())
    }
}

fn is_valid_verb(name: &str) -> bool {
    !name.is_empty() && !name.chars().any(|c| c.is_whitespace() || c == '(' || c == ')')
}

/// Load the registry from `path`, or fall back to the built-in one.
pub fn load_registry(path: Option<&Path>) -> Result<ActionRegistry, ConfigError> {
    let Some(path) = path else {
        return Ok(ActionRegistry::default());
    };
    let registry = RegistryConfig::load(path)?.into_registry()?;
    tracing::info!(path = %path.display(), verbs = registry.len(), "loaded action registry");
    Ok(registry)
}
