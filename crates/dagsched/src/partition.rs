//! Phase 2: stream assignment.
//!
//! Builds one critical partition (the chain obtained by always descending
//! through the heaviest input at a branch) plus a forest of side
//! partitions rooted at the branching nodes, then distributes the side
//! partitions across `K-1` secondary streams with a longest-processing-time
//! (LPT) bin-packing heuristic. The critical partition always lands on
//! stream 0.

use std::collections::HashMap;

use dagsched_core::graph::{IRef, Program};

use crate::model::StreamId;
use crate::weight::WeightMap;

/// Below this cumulative weight, a branch isn't worth splitting into its
/// own partition — it stays folded into whichever partition reached it.
const MIN_PARTITION_THRESHOLD: u64 = 2;

#[derive(Debug, Default)]
struct Partition {
    weight: u64,
    instructions: Vec<IRef>,
}

impl Partition {
    fn add(&mut self, ins: IRef, iw: u64) {
        self.weight += iw;
        self.instructions.push(ins);
    }
}

/// Which partition a visited node should be appended to while the
/// partition forest is under construction.
#[derive(Clone, Copy)]
enum Dest {
    Critical,
    Side(IRef, usize),
}

/// The resulting stream assignment: every weighted instruction maps to
/// exactly one stream in `[0, concurrency)`.
#[derive(Debug, Default)]
pub struct StreamAssignment {
    stream: HashMap<IRef, StreamId>,
}

impl StreamAssignment {
    pub fn stream(&self, ins: IRef) -> Option<StreamId> {
        self.stream.get(&ins).copied()
    }

    pub fn is_assigned(&self, ins: IRef) -> bool {
        self.stream.contains_key(&ins)
    }

    fn set(&mut self, ins: IRef, stream: StreamId, concurrency: usize) {
        assert!(
            stream < concurrency,
            "stream {stream} out of range for concurrency {concurrency}"
        );
        self.stream.insert(ins, stream);
    }

    fn assign_partition(&mut self, weights: &WeightMap, part: &Partition, stream: StreamId, concurrency: usize) {
        for &ins in &part.instructions {
            if weights.iw(ins) > 0 {
                self.set(ins, stream, concurrency);
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn set_for_test(&mut self, ins: IRef, stream: StreamId, concurrency: usize) {
        self.set(ins, stream, concurrency);
    }
}

/// Build the critical partition plus side-partition forest and assign
/// every weighted node a stream.
pub fn assign_streams(
    program: &Program,
    weights: &WeightMap,
    sink: IRef,
    concurrency: usize,
) -> StreamAssignment {
    let (critical, partitions) = build_partitions(program, weights, sink);

    let mut assignment = StreamAssignment::default();
    assignment.assign_partition(weights, &critical, 0, concurrency);

    if concurrency == 1 {
        // No secondary streams exist to draw from: every side partition
        // collapses onto stream 0 alongside the critical chain.
        for deque in partitions.values() {
            for part in deque {
                assignment.assign_partition(weights, part, 0, concurrency);
            }
        }
        return assignment;
    }

    let mut loads = vec![0u64; concurrency - 1];

    // Branch owners are visited in program-position order, not hash order,
    // so the bin-packing result is reproducible across runs.
    let mut owners: Vec<IRef> = partitions.keys().copied().collect();
    owners.sort_by_key(|&owner| program.position(owner).unwrap_or(usize::MAX));

    for owner in owners {
        let mut sides: Vec<&Partition> = partitions[&owner]
            .iter()
            .filter(|p| !p.instructions.is_empty())
            .collect();
        sides.sort_by(|a, b| (b.weight, b.instructions.len()).cmp(&(a.weight, a.instructions.len())));

        for part in sides {
            let stream = loads
                .iter()
                .enumerate()
                .min_by_key(|&(_, &load)| load)
                .map(|(i, _)| i)
                .expect("concurrency > 1 implies at least one secondary stream");
            assignment.assign_partition(weights, part, stream + 1, concurrency);
            loads[stream] += part.weight;
        }
    }

    assignment
}

fn build_partitions(
    program: &Program,
    weights: &WeightMap,
    sink: IRef,
) -> (Partition, HashMap<IRef, Vec<Partition>>) {
    let mut critical = Partition::default();
    let mut partitions: HashMap<IRef, Vec<Partition>> = HashMap::new();
    let mut stack = vec![(sink, Dest::Critical)];

    while let Some((ins, dest)) = stack.pop() {
        if weights.w(ins) == 0 {
            continue;
        }

        match dest {
            Dest::Critical => critical.add(ins, weights.iw(ins)),
            Dest::Side(owner, idx) => partitions.get_mut(&owner).unwrap()[idx].add(ins, weights.iw(ins)),
        }

        let inputs = program.inputs(ins);
        // First maximal input on ties, matching a stable max-scan.
        let heaviest = inputs.iter().copied().fold(None, |best: Option<IRef>, i| match best {
            Some(b) if weights.w(b) >= weights.w(i) => Some(b),
            _ => Some(i),
        });

        for &i in inputs {
            if Some(i) == heaviest || weights.w(i) <= MIN_PARTITION_THRESHOLD {
                stack.push((i, dest));
            } else {
                let deque = partitions.entry(ins).or_default();
                deque.push(Partition::default());
                let idx = deque.len() - 1;
                stack.push((i, Dest::Side(ins, idx)));
            }
        }
    }

    (critical, partitions)
}
