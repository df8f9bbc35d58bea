//! Phase 5: concurrent-instruction / memory-conflict pass.
//!
//! Two kernels that can execute concurrently on different streams must not
//! have their memory lifetimes overlap in ways a downstream memory planner
//! would miss. This pass walks the program in reverse, finds every merge
//! point reachable downstream of each instruction, and inserts conservative
//! `@identity` instructions right before each merge linking every
//! cross-stream sibling still live at that point — extending their
//! liveness through the merge without adding any runtime cost.

use std::collections::{HashMap, HashSet};

use dagsched_core::graph::operator::{is_context_free, is_structural};
use dagsched_core::graph::{IRef, Operator, Position, Program};

use crate::partition::StreamAssignment;
use crate::streams::{is_merge_point, streams};
use crate::weight::WeightMap;

/// Name of the zero-cost instructions this pass inserts to extend
/// cross-stream liveness through a merge point.
const IDENTITY_OP: &str = "@identity";

pub fn insert_memory_conflicts(program: &mut Program, weights: &WeightMap, assign: &StreamAssignment) {
    let order: Vec<IRef> = program.iter().collect();

    // node -> merge points reachable downstream of it.
    let mut merge_from: HashMap<IRef, HashSet<IRef>> = HashMap::new();
    // merge -> stream -> instructions live through it.
    let mut result: HashMap<IRef, Vec<Vec<IRef>>> = HashMap::new();

    for &ins in order.iter().rev() {
        let mut reach: HashSet<IRef> = HashSet::new();
        for &o in program.outputs(ins) {
            if is_merge_point(program, weights, assign, o, None) {
                reach.insert(o);
            }
            if let Some(further) = merge_from.get(&o) {
                reach.extend(further.iter().copied());
            }
        }

        let current_streams = streams(program, weights, assign, ins);

        for &merge in &reach {
            let slots = result.entry(merge).or_default();
            for &s in &current_streams {
                if slots.len() <= s {
                    slots.resize(s + 1, Vec::new());
                }
                slots[s].push(ins);
                for &i in program.inputs(ins) {
                    if assign.is_assigned(i) {
                        continue;
                    }
                    if let Some(op) = program.operator(i) {
                        if !is_context_free(op) && !is_structural(op) {
                            slots[s].push(i);
                        }
                    }
                }
            }
        }

        merge_from.insert(ins, reach);
    }

    // Deterministic insertion order: by merge point's program position.
    let mut merges: Vec<IRef> = result.keys().copied().collect();
    merges.sort_by_key(|&m| program.position(m).unwrap_or(usize::MAX));

    for merge in merges {
        let slots = result[&merge].clone();
        for i in 0..slots.len() {
            for j in 0..slots.len() {
                if i == j {
                    continue;
                }
                for &ins1 in &slots[i] {
                    let mut args = vec![ins1];
                    args.extend(slots[j].iter().copied());
                    program
                        .insert_instruction(Position::Before(merge), Operator::structural(IDENTITY_OP), args)
                        .expect("identity arguments reference instructions already in the program");
                }
            }
        }
    }
}
