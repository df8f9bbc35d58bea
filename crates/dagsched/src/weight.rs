//! Phase 1: weight accumulation.
//!
//! Computes, for every ancestor of the program's sink, an instantaneous
//! weight `iw` (the cost of that node alone) and a cumulative weight `w`
//! (that cost plus every ancestor's, summed once per incoming edge — a
//! shared ancestor reachable through two paths contributes its weight
//! twice). That path-weight bias is what later lets the partitioner treat
//! heavily-depended-upon nodes as belonging on the critical path.

use std::collections::HashMap;

use dagsched_core::graph::operator::is_zero_weight_class;
use dagsched_core::graph::{IRef, Program};

use crate::model::ScheduleModel;

/// Per-instruction instantaneous (`iw`) and cumulative (`w`) weights.
#[derive(Debug, Default)]
pub struct WeightMap {
    iw: HashMap<IRef, u64>,
    w: HashMap<IRef, u64>,
}

impl WeightMap {
    pub fn iw(&self, ins: IRef) -> u64 {
        self.iw.get(&ins).copied().unwrap_or(0)
    }

    pub fn w(&self, ins: IRef) -> u64 {
        self.w.get(&ins).copied().unwrap_or(0)
    }

    #[cfg(test)]
    pub(crate) fn set_for_test(&mut self, ins: IRef, iw: u64, w: u64) {
        self.iw.insert(ins, iw);
        self.w.insert(ins, w);
    }

    /// Compute `w[sink]` and every ancestor's weight, memoized.
    ///
    /// Uses an explicit work stack rather than native recursion — a node is
    /// only resolved once every one of its inputs already carries a weight,
    /// so this is a standard iterative post-order traversal with
    /// memoization, scaling past the native stack depth on large graphs.
    pub fn accumulate<M: ScheduleModel>(
        program: &Program,
        sink: IRef,
        model: &mut M,
    ) -> Result<Self, M::Error> {
        let mut maps = WeightMap::default();
        let mut stack = vec![sink];

        while let Some(&ins) = stack.last() {
            if maps.w.contains_key(&ins) {
                stack.pop();
                continue;
            }

            let inputs = program.inputs(ins);
            let mut pending = false;
            for &i in inputs {
                if !maps.w.contains_key(&i) {
                    stack.push(i);
                    pending = true;
                }
            }
            if pending {
                continue;
            }
            stack.pop();

            let op = program.operator(ins).expect("instruction must exist in its own program");
            let weight = if is_zero_weight_class(op) {
                0
            } else {
                model.weight(op)?
            };
            let accumulated = inputs.iter().fold(weight, |acc, &i| acc + maps.w(i));
            maps.iw.insert(ins, weight);
            maps.w.insert(ins, accumulated);
        }

        Ok(maps)
    }
}
