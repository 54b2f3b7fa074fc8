//! `TerminalReporter`: the `ProgressReporter` the `tidb` command hands to
//! launch code.

use crate::application::ports::ProgressReporter;
use crate::output::OutputContext;

/// Forwards launch progress to an `OutputContext`, so quiet and JSON modes
/// silence it the same way as every other line.
pub struct TerminalReporter<'a> {
    ctx: &'a OutputContext,
}

impl<'a> TerminalReporter<'a> {
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }
}

impl ProgressReporter for TerminalReporter<'_> {
    fn step(&self, message: &str) {
        self.ctx.step(message);
    }

    fn success(&self, message: &str) {
        self.ctx.success(message);
    }

    fn warn(&self, message: &str) {
        self.ctx.warn(message);
    }
}
