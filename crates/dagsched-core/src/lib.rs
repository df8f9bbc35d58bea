//! Instruction graph container.
//!
//! A program is an ordered, mutable list of instruction nodes connected by
//! data dependencies. This crate owns the container primitives a scheduling
//! pass needs — stable instruction references, relocation, and insertion —
//! independent of any particular frontend or backend.

pub mod graph;
