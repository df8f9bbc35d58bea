//! Phase 3: topological reordering biased toward the critical path.
//!
//! Walks ancestors of the sink, moving each to the front of the program
//! with the heaviest sibling at every branch moved last — so it ends up
//! closest to the front, adjacent to its consumer, while lighter chains
//! (which will need to record events for the critical consumer) are
//! emitted earlier.

use dagsched_core::graph::{IRef, Position, Program};

use crate::weight::WeightMap;

/// Reorder every ancestor of `sink` in place. `sink` itself is never moved.
///
/// Implemented as an explicit stack of per-node sibling iterators rather
/// than native recursion, preserving the exact "move, then immediately
/// descend" order a recursive formulation implies while scaling past the
/// native stack depth on large graphs.
pub fn topological_reorder(program: &mut Program, weights: &WeightMap, sink: IRef) {
    let mut stack: Vec<std::vec::IntoIter<IRef>> = vec![sorted_inputs(program, weights, sink).into_iter()];

    while let Some(frame) = stack.last_mut() {
        match frame.next() {
            None => {
                stack.pop();
            }
            Some(ins) => {
                program
                    .move_instruction(ins, Position::Front)
                    .expect("instruction moved during reordering must still exist");
                stack.push(sorted_inputs(program, weights, ins).into_iter());
            }
        }
    }
}

fn sorted_inputs(program: &Program, weights: &WeightMap, ins: IRef) -> Vec<IRef> {
    let mut args: Vec<IRef> = program.inputs(ins).to_vec();
    args.sort_by_key(|&i| (weights.w(i), program.inputs(i).len()));
    args
}
