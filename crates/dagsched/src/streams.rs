//! Stream-set enumeration, merge and split point predicates.
//!
//! A node's "stream set" is found by walking through zero-weight
//! (`iw == 0`) neighbors transparently and collecting the stream of the
//! first weighted neighbor found on each path — never descending past a
//! weighted node, so cost stays linear in the touched frontier rather than
//! the whole subgraph.
//!
//! [`is_merge_point`] and [`is_split_point`] only need a yes/no answer, so
//! they short-circuit: [`diverges`] returns as soon as a second distinct
//! stream is seen rather than finishing the frontier. The enumeration
//! helpers below them ([`streams`], [`get_recorded_instructions`], the
//! diagnostic channel's [`input_streams`]) need the full set or the full
//! nearest-ancestor map, so they can't take the same shortcut.

use std::collections::{HashMap, HashSet};

use dagsched_core::graph::{IRef, Program};

use crate::model::StreamId;
use crate::partition::StreamAssignment;
use crate::weight::WeightMap;

#[derive(Clone, Copy)]
enum Direction {
    Inputs,
    Outputs,
}

fn neighbors<'a>(program: &'a Program, dir: Direction, ins: IRef) -> &'a [IRef] {
    match dir {
        Direction::Inputs => program.inputs(ins),
        Direction::Outputs => program.outputs(ins),
    }
}

fn reachable_streams(
    program: &Program,
    weights: &WeightMap,
    assign: &StreamAssignment,
    start: IRef,
    dir: Direction,
) -> Vec<StreamId> {
    let mut out = Vec::new();
    let mut frontier = vec![start];
    while let Some(n) = frontier.pop() {
        for &nb in neighbors(program, dir, n) {
            if weights.iw(nb) == 0 {
                frontier.push(nb);
            } else {
                out.push(
                    assign
                        .stream(nb)
                        .expect("weighted instruction must carry a stream"),
                );
            }
        }
    }
    out
}

/// Exposed for the diagnostic trace channel, which reports the raw input
/// stream set rather than a merge/split yes-or-no answer.
pub(crate) fn input_streams(
    program: &Program,
    weights: &WeightMap,
    assign: &StreamAssignment,
    ins: IRef,
) -> Vec<StreamId> {
    reachable_streams(program, weights, assign, ins, Direction::Inputs)
}

/// True as soon as the frontier walk from `start` sees a second distinct
/// stream (seeding the comparison with `relative_to` when given) — stops
/// descending the instant divergence is found rather than enumerating the
/// rest of the frontier.
fn diverges(
    program: &Program,
    weights: &WeightMap,
    assign: &StreamAssignment,
    start: IRef,
    dir: Direction,
    relative_to: Option<StreamId>,
) -> bool {
    let mut seen = relative_to;
    let mut frontier = vec![start];
    while let Some(n) = frontier.pop() {
        for &nb in neighbors(program, dir, n) {
            if weights.iw(nb) == 0 {
                frontier.push(nb);
                continue;
            }
            let s = assign
                .stream(nb)
                .expect("weighted instruction must carry a stream");
            match seen {
                None => seen = Some(s),
                Some(first) if first != s => return true,
                Some(_) => {}
            }
        }
    }
    false
}

/// The set of streams reachable from `ins`: its own, if assigned, else the
/// set seen through its inputs.
pub fn streams(
    program: &Program,
    weights: &WeightMap,
    assign: &StreamAssignment,
    ins: IRef,
) -> HashSet<StreamId> {
    if let Some(s) = assign.stream(ins) {
        return HashSet::from([s]);
    }
    reachable_streams(program, weights, assign, ins, Direction::Inputs)
        .into_iter()
        .collect()
}

/// True if `ins`'s inputs (seen transparently) reach at least two distinct
/// streams, or — when `relative_to` is given — reach any stream other than
/// it.
pub fn is_merge_point(
    program: &Program,
    weights: &WeightMap,
    assign: &StreamAssignment,
    ins: IRef,
    relative_to: Option<StreamId>,
) -> bool {
    diverges(program, weights, assign, ins, Direction::Inputs, relative_to)
}

/// True if `ins`'s outputs (seen transparently) reach at least two distinct
/// streams, or — when `relative_to` is given — reach any stream other than
/// it.
pub fn is_split_point(
    program: &Program,
    weights: &WeightMap,
    assign: &StreamAssignment,
    ins: IRef,
    relative_to: Option<StreamId>,
) -> bool {
    diverges(program, weights, assign, ins, Direction::Outputs, relative_to)
}

/// One representative ancestor per reachable upstream stream: the weighted
/// ancestor nearest `start` in program order, found by walking inputs
/// transparently through zero-weight passthroughs.
pub fn get_recorded_instructions(
    program: &Program,
    weights: &WeightMap,
    assign: &StreamAssignment,
    start: IRef,
) -> Vec<IRef> {
    let start_pos = program.position(start).unwrap_or(usize::MAX);
    let mut nearest: HashMap<StreamId, IRef> = HashMap::new();
    let mut frontier = vec![start];

    while let Some(n) = frontier.pop() {
        for &i in program.inputs(n) {
            if weights.iw(i) == 0 {
                frontier.push(i);
                continue;
            }
            let stream = assign
                .stream(i)
                .expect("weighted instruction must carry a stream");
            nearest
                .entry(stream)
                .and_modify(|cur| {
                    let dist_cur = start_pos.saturating_sub(program.position(*cur).unwrap_or(usize::MAX));
                    let dist_i = start_pos.saturating_sub(program.position(i).unwrap_or(usize::MAX));
                    if dist_i < dist_cur {
                        *cur = i;
                    }
                })
                .or_insert(i);
        }
    }

    nearest.into_values().collect()
}
