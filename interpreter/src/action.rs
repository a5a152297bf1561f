use std::io::Write;

use crate::error::RuntimeError;
use crate::registry::ActionId;

/// The host capability that actually performs a resolved action.
///
/// The interpreter calls [`invoke`](ActionHandler::invoke) exactly once per
/// successfully interpreted sentence and never on failure.
pub trait ActionHandler {
    fn invoke(&mut self, action: &ActionId, argument: Option<&str>) -> Result<(), RuntimeError>;
}

impl<F> ActionHandler for F
where
    F: FnMut(&ActionId, Option<&str>) -> Result<(), RuntimeError>,
{
    fn invoke(&mut self, action: &ActionId, argument: Option<&str>) -> Result<(), RuntimeError> {
        self(action, argument)
    }
}

/// Performs [`ActionId::OUTPUT`] by writing lines to a writer.
pub struct WriterActions<'w> {
    output: &'w mut dyn Write,
}

impl<'w> WriterActions<'w> {
    pub fn new(output: &'w mut dyn Write) -> Self {
        WriterActions { output }
    }
}

impl ActionHandler for WriterActions<'_> {
    fn invoke(&mut self, action: &ActionId, argument: Option<&str>) -> Result<(), RuntimeError> {
        if *action != ActionId::OUTPUT {
            return Err(RuntimeError::UnsupportedAction(action.clone()));
        }
        writeln!(self.output, "{}", argument.unwrap_or_default())?;
        Ok(())
    }
}
