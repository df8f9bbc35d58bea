//! Phase 4: synchronization insertion.
//!
//! Walks the reordered program front to back, attaching each weighted
//! instruction to its stream and inserting the minimal set of
//! record/wait pairs needed to preserve cross-stream data dependencies.

use std::collections::{HashMap, HashSet};

use dagsched_core::graph::{IRef, Program};

use crate::model::{EventId, ScheduleModel, StreamId};
use crate::partition::StreamAssignment;
use crate::streams::{get_recorded_instructions, is_merge_point, is_split_point};
use crate::weight::WeightMap;

pub fn insert_synchronization<M: ScheduleModel>(
    program: &mut Program,
    model: &mut M,
    weights: &WeightMap,
    assign: &StreamAssignment,
) -> Result<(), M::Error> {
    let order: Vec<IRef> = program.iter().collect();

    let mut ins2wait: HashMap<IRef, EventId> = HashMap::new();
    let mut next_event: EventId = 0;
    let mut waited_for: HashMap<StreamId, HashSet<EventId>> = HashMap::new();
    let mut ins2waited: HashMap<IRef, HashSet<EventId>> = HashMap::new();

    for ins in order {
        let Some(stream) = assign.stream(ins) else {
            continue;
        };
        debug_assert!(weights.iw(ins) > 0, "assigned instruction must be weighted");
        debug_assert!(stream < model.concurrency(), "stream out of range");

        model.sched(program, ins, stream)?;

        if is_merge_point(program, weights, assign, ins, Some(stream)) {
            for i in get_recorded_instructions(program, weights, assign, ins) {
                let Some(producer_stream) = assign.stream(i) else {
                    continue;
                };
                if producer_stream == stream {
                    continue;
                }

                let event = if let Some(&e) = ins2wait.get(&i) {
                    e
                } else {
                    let e = next_event;
                    next_event += 1;
                    ins2wait.insert(i, e);
                    model.record(program, i, e)?;
                    e
                };

                let consumer_waits = waited_for.entry(stream).or_default();
                if !consumer_waits.contains(&event) {
                    model.wait(program, ins, event)?;
                }
                consumer_waits.insert(event);

                if let Some(inherited) = ins2waited.get(&i).cloned() {
                    waited_for.entry(stream).or_default().extend(inherited);
                }
            }
        }

        if is_split_point(program, weights, assign, ins, Some(stream)) {
            let snapshot = waited_for.entry(stream).or_default().clone();
            ins2waited.insert(ins, snapshot);
        }
    }

    Ok(())
}
