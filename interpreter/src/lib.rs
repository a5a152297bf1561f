pub mod action;
pub mod error;
pub mod executor;
pub mod registry;
pub mod transform;

pub use action::{ActionHandler, WriterActions};
pub use error::{DiagnosticError, RuntimeError};
pub use executor::{Interpreter, Invocation, check_script, execute_script};
pub use registry::{ActionId, ActionRegistry, RegistryBuilder};
pub use transform::{Transform, Value, decode_literal};
