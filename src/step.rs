//! Step abstraction driven by the build orchestrator.

use std::future::Future;
use std::pin::Pin;

use crate::state::BuildState;

/// Outcome of running a step.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StepAction {
    /// Proceed to the next step.
    Continue,
    /// Stop the build; the orchestrator unwinds by running cleanups.
    Halt,
}

/// Future returned by step operations.
pub type StepFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A unit of work in a build pipeline.
///
/// The orchestrator calls [`Step::run`] in sequence and, once the build ends
/// for any reason, [`Step::cleanup`] in reverse order for every step that
/// ran. Cancelling a build drops the pending `run` future.
pub trait Step {
    /// Performs the step, reading and publishing values through `state`.
    fn run<'a>(&'a mut self, state: &'a mut BuildState) -> StepFuture<'a, StepAction>;

    /// Releases whatever the step created. Never fails.
    fn cleanup<'a>(&'a mut self, state: &'a BuildState) -> StepFuture<'a, ()>;
}
