//! Multi-stream scheduler for a static instruction DAG.
//!
//! Given a program whose sink instruction roots a DAG of weighted
//! operations, [`apply`] assigns each weighted instruction to one of a
//! target's concurrent execution streams, reorders the program toward the
//! critical path, and inserts the record/wait and memory-conflict
//! instructions needed to make that parallel schedule correct.
//!
//! The four phases live in their own modules, in the order `apply` runs
//! them: [`weight`], [`partition`], [`reorder`], then [`sync`] and
//! [`conflict`]. [`streams`] holds the merge/split predicates shared by the
//! last two phases, and [`model`] defines the capability set a backend
//! implements to parameterize the whole pass.

pub mod conflict;
pub mod diagnostic;
pub mod error;
pub mod model;
pub mod partition;
pub mod reorder;
pub mod schedule;
pub mod streams;
pub mod sync;
pub mod weight;

pub use error::ScheduleError;
pub use model::{EventId, ScheduleModel, StreamId};
pub use schedule::apply;
