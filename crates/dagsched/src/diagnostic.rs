//! Optional diagnostic trace channel.
//!
//! Mirrors the kind of compile-time trace a backend can opt into; produces
//! no observable output beyond the lines it returns.

use dagsched_core::graph::Program;

use crate::partition::StreamAssignment;
use crate::streams::input_streams;
use crate::weight::WeightMap;

/// Render one line per instruction: `weight=<w> input={<streams,...>}`,
/// with a trailing ` stream=<s>` when the instruction carries one.
pub fn trace_lines(program: &Program, weights: &WeightMap, assign: &StreamAssignment) -> Vec<String> {
    program
        .iter()
        .map(|ins| {
            let mut inputs = input_streams(program, weights, assign, ins);
            inputs.sort_unstable();
            let inputs = inputs
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(",");
            let mut line = format!("weight={} input={{{inputs}}}", weights.w(ins));
            if let Some(stream) = assign.stream(ins) {
                line.push_str(&format!(" stream={stream}"));
            }
            line
        })
        .collect()
}
