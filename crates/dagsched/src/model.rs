//! The schedule model: the target-specific capability set the scheduler
//! calls into for cost estimation and synchronization emission.

use dagsched_core::graph::{IRef, Operator, Program};

/// Concurrent execution stream identifier, in `[0, concurrency())`.
pub type StreamId = usize;

/// Opaque identifier correlating one `record` to one or more `wait`s.
pub type EventId = u64;

/// Target-specific hooks the scheduler needs to produce a parallel
/// schedule: how many streams are available, how expensive an operator is,
/// and how to emit the backend's stream-assignment and synchronization
/// instructions.
///
/// Expressed as a trait — a capability set a backend composes from
/// independent pieces — rather than a base class; nothing about the
/// scheduler depends on any particular inheritance hierarchy.
pub trait ScheduleModel {
    /// The error a backend hook can fail with. Propagated unchanged by the
    /// scheduler via [`crate::ScheduleError::Model`].
    type Error: std::error::Error + 'static;

    /// Number of concurrent execution streams available.
    fn concurrency(&self) -> usize;

    /// Nonnegative runtime cost of an operator, in the model's own units.
    /// Never called for context-free or structural (`@`-prefixed)
    /// operators — those are zero-weight by classification alone.
    fn weight(&mut self, op: &Operator) -> Result<u64, Self::Error>;

    /// Attach a stream assignment to `ins` (backend-defined mutation).
    fn sched(&mut self, program: &mut Program, ins: IRef, stream: StreamId) -> Result<(), Self::Error>;

    /// Emit a record of `event` on `producer`'s stream.
    fn record(&mut self, program: &mut Program, producer: IRef, event: EventId) -> Result<(), Self::Error>;

    /// Emit a wait for `event` before `consumer` executes.
    fn wait(&mut self, program: &mut Program, consumer: IRef, event: EventId) -> Result<(), Self::Error>;
}
