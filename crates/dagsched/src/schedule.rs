//! Entry point: runs the four-phase scheduling pass over one program.

use dagsched_core::graph::Program;

use crate::conflict::insert_memory_conflicts;
use crate::diagnostic::trace_lines;
use crate::error::ScheduleError;
use crate::model::ScheduleModel;
use crate::partition::assign_streams;
use crate::reorder::topological_reorder;
use crate::sync::insert_synchronization;
use crate::weight::WeightMap;

/// Assign instructions to streams, reorder the program toward the critical
/// path, and insert cross-stream synchronization and memory-conflict
/// identities — in place.
///
/// `trace` requests the optional diagnostic annotation lines from
/// [`crate::diagnostic`]; pass `false` to skip the extra bookkeeping.
pub fn apply<M: ScheduleModel>(
    program: &mut Program,
    model: &mut M,
    trace: bool,
) -> Result<Vec<String>, ScheduleError<M::Error>> {
    let concurrency = model.concurrency();
    if concurrency == 0 {
        return Err(ScheduleError::InvalidConcurrency);
    }

    let Some(sink) = program.sink() else {
        return Ok(Vec::new());
    };

    let weights = WeightMap::accumulate(program, sink, model).map_err(ScheduleError::Model)?;
    let assignment = assign_streams(program, &weights, sink, concurrency);

    topological_reorder(program, &weights, sink);

    let lines = if trace {
        trace_lines(program, &weights, &assignment)
    } else {
        Vec::new()
    };

    insert_synchronization(program, model, &weights, &assignment).map_err(ScheduleError::Model)?;
    insert_memory_conflicts(program, &weights, &assignment);

    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dagsched_core::graph::{IRef, Operator};
    use std::collections::HashMap as Map;
    use std::convert::Infallible;

    /// A schedule model whose weight table is keyed by operator name and
    /// which records every sched/record/wait call for assertions.
    #[derive(Default)]
    struct TestModel {
        concurrency: usize,
        weights: Map<String, u64>,
        sched_calls: Vec<(IRef, usize)>,
        record_calls: Vec<(IRef, u64)>,
        wait_calls: Vec<(IRef, u64)>,
    }

    impl TestModel {
        fn new(concurrency: usize) -> Self {
            Self {
                concurrency,
                ..Default::default()
            }
        }

        fn weighted(mut self, name: &str, weight: u64) -> Self {
            self.weights.insert(name.to_string(), weight);
            self
        }
    }

    impl ScheduleModel for TestModel {
        type Error = Infallible;

        fn concurrency(&self) -> usize {
            self.concurrency
        }

        fn weight(&mut self, op: &dagsched_core::graph::Operator) -> Result<u64, Self::Error> {
            Ok(self.weights.get(op.name()).copied().unwrap_or(1))
        }

        fn sched(&mut self, _: &mut Program, ins: IRef, stream: usize) -> Result<(), Self::Error> {
            self.sched_calls.push((ins, stream));
            Ok(())
        }

        fn record(&mut self, _: &mut Program, producer: IRef, event: u64) -> Result<(), Self::Error> {
            self.record_calls.push((producer, event));
            Ok(())
        }

        fn wait(&mut self, _: &mut Program, consumer: IRef, event: u64) -> Result<(), Self::Error> {
            self.wait_calls.push((consumer, event));
            Ok(())
        }
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let mut p = Program::new();
        p.push(Operator::new("a"), vec![]).unwrap();
        let mut model = TestModel::new(0);
        let err = apply(&mut p, &mut model, false).unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidConcurrency));
    }

    #[test]
    fn empty_program_is_a_no_op() {
        let mut p = Program::new();
        let mut model = TestModel::new(2);
        let lines = apply(&mut p, &mut model, true).unwrap();
        assert!(lines.is_empty());
    }

    // S1 — linear chain, K=2, unit weights: everything on stream 0, no sync.
    #[test]
    fn s1_linear_chain_needs_no_synchronization() {
        let mut p = Program::new();
        let a = p.push(Operator::new("a"), vec![]).unwrap();
        let b = p.push(Operator::new("b"), vec![a]).unwrap();
        let c = p.push(Operator::new("c"), vec![b]).unwrap();
        let _d = p.push(Operator::new("d"), vec![c]).unwrap();

        let mut model = TestModel::new(2);
        apply(&mut p, &mut model, false).unwrap();

        assert_eq!(model.sched_calls.len(), 4);
        assert!(model.sched_calls.iter().all(|&(_, s)| s == 0));
        assert!(model.record_calls.is_empty());
        assert!(model.wait_calls.is_empty());
    }

    // S2 — diamond, K=2: heavy branch stays critical (stream 0), light
    // branch moves to stream 1 and needs exactly one record/wait. `l` and
    // `r` are independent leaves (not sharing an ancestor) so each lands in
    // exactly one partition.
    #[test]
    fn s2_diamond_assigns_light_branch_to_secondary_stream() {
        let mut p = Program::new();
        let l = p.push(Operator::new("l"), vec![]).unwrap();
        let r = p.push(Operator::new("r"), vec![]).unwrap();
        let s = p.push(Operator::new("s"), vec![l, r]).unwrap();

        let mut model = TestModel::new(2).weighted("l", 3).weighted("r", 5);
        apply(&mut p, &mut model, false).unwrap();

        let stream_of = |model: &TestModel, ins: IRef| {
            model
                .sched_calls
                .iter()
                .find(|&&(i, _)| i == ins)
                .map(|&(_, s)| s)
        };

        assert_eq!(stream_of(&model, s), Some(0));
        assert_eq!(stream_of(&model, r), Some(0));
        assert_eq!(stream_of(&model, l), Some(1));

        assert_eq!(model.record_calls.len(), 1);
        assert_eq!(model.record_calls[0].0, l);
        assert_eq!(model.wait_calls.len(), 1);
        assert_eq!(model.wait_calls[0].0, s);
    }

    // S4 — zero-weight passthrough: the recorded ancestor for a merge is
    // the weighted producer itself, not the structural node between them.
    #[test]
    fn s4_passthrough_node_is_transparent_to_synchronization() {
        let mut p = Program::new();
        let producer = p.push(Operator::new("p"), vec![]).unwrap();
        let passthrough = p
            .push(Operator::structural("@reshape"), vec![producer])
            .unwrap();
        let other = p.push(Operator::new("q"), vec![]).unwrap();
        let merge = p.push(Operator::new("m"), vec![passthrough, other]).unwrap();

        let mut model = TestModel::new(2).weighted("p", 5).weighted("q", 10);
        apply(&mut p, &mut model, false).unwrap();

        // The passthrough never appears as a sched target.
        assert!(model.sched_calls.iter().all(|&(i, _)| i != passthrough));
        // Exactly one record/wait pair, and it names the real producer.
        assert_eq!(model.record_calls.len(), 1);
        assert_eq!(model.record_calls[0].0, producer);
        assert_eq!(model.wait_calls[0].0, merge);
    }

    // S5 — K=1 degenerate: everything collapses to stream 0, no sync at all.
    #[test]
    fn s5_single_stream_has_no_synchronization() {
        let mut p = Program::new();
        let x = p.push(Operator::new("x"), vec![]).unwrap();
        let l = p.push(Operator::new("l"), vec![x]).unwrap();
        let r = p.push(Operator::new("r"), vec![x]).unwrap();
        let _s = p.push(Operator::new("s"), vec![l, r]).unwrap();

        let mut model = TestModel::new(1);
        apply(&mut p, &mut model, false).unwrap();

        assert!(model.sched_calls.iter().all(|&(_, s)| s == 0));
        assert!(model.record_calls.is_empty());
        assert!(model.wait_calls.is_empty());
    }

    // S6 — two independent side partitions (`v` and `w`) both collapse onto
    // the lone secondary stream, so both feed the merge from stream 1
    // alongside the critical `crit` branch on stream 0. The nearest-ancestor
    // collapse in `get_recorded_instructions` keeps only one of the two
    // same-stream candidates, so exactly one record/wait pair is emitted.
    #[test]
    fn s6_same_stream_fan_in_dedups_to_one_event() {
        let mut p = Program::new();
        let crit = p.push(Operator::new("crit"), vec![]).unwrap();
        let v = p.push(Operator::new("v"), vec![]).unwrap();
        let w = p.push(Operator::new("w"), vec![]).unwrap();
        let m = p.push(Operator::new("m"), vec![crit, v, w]).unwrap();

        let mut model = TestModel::new(2)
            .weighted("crit", 10)
            .weighted("v", 3)
            .weighted("w", 3);
        apply(&mut p, &mut model, false).unwrap();

        let stream_of = |model: &TestModel, ins: IRef| {
            model
                .sched_calls
                .iter()
                .find(|&&(i, _)| i == ins)
                .map(|&(_, s)| s)
        };
        assert_eq!(stream_of(&model, crit), Some(0));
        assert_eq!(stream_of(&model, v), Some(1));
        assert_eq!(stream_of(&model, w), Some(1));

        assert_eq!(model.record_calls.len(), 1);
        assert_eq!(model.wait_calls.len(), 1);
        assert_eq!(model.wait_calls[0].0, m);
    }

    #[test]
    fn determinism_two_runs_produce_identical_sched_traces() {
        let build = || {
            let mut p = Program::new();
            let x = p.push(Operator::new("x"), vec![]).unwrap();
            let l = p.push(Operator::new("l"), vec![x]).unwrap();
            let r = p.push(Operator::new("r"), vec![x]).unwrap();
            let _s = p.push(Operator::new("s"), vec![l, r]).unwrap();
            p
        };

        let mut p1 = build();
        let mut m1 = TestModel::new(2).weighted("r", 5);
        apply(&mut p1, &mut m1, false).unwrap();

        let mut p2 = build();
        let mut m2 = TestModel::new(2).weighted("r", 5);
        apply(&mut p2, &mut m2, false).unwrap();

        assert_eq!(m1.sched_calls.len(), m2.sched_calls.len());
        assert_eq!(p1.order().len(), p2.order().len());
    }
}
