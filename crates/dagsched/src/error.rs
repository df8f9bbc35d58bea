//! Errors the scheduler can surface.

use thiserror::Error;

/// Errors raised by [`crate::apply`].
///
/// `E` is the backing [`crate::ScheduleModel`]'s own error type — model
/// failures are propagated unchanged rather than wrapped in a generic
/// message, so a caller can match on the original error. `Program`
/// container invariants (dangling references, moves past the sink) are
/// programmer bugs, not recoverable conditions, and are asserted against
/// internally rather than surfaced here.
#[derive(Debug, Error)]
pub enum ScheduleError<E: std::error::Error + 'static> {
    #[error("schedule model error: {0}")]
    Model(#[source] E),

    #[error("concurrency must be at least 1")]
    InvalidConcurrency,
}
