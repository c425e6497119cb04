//! Primary output voting
//!
//! Every candidate output collects one vote per pointer inside its geometry,
//! plus an optional bias. With several candidates the strictly greatest vote
//! wins, so ties go to the first candidate in enumeration order. A single
//! candidate wins without a vote and no candidates means no output.

use crate::compositor::OutputId;
use crate::geometry::{Point, Rectangle};

/// Bias for outputs where the target workspace is already shown. It beats
/// any raw pointer-vote difference below ten seats.
pub const ATTACHED_WORKSPACE_BIAS: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub output: OutputId,
    pub geometry: Rectangle,
    pub bias: i32,
}

impl Candidate {
    pub fn new(output: OutputId, geometry: Rectangle) -> Self {
        Self {
            output,
            geometry,
            bias: 0,
        }
    }

    pub fn with_bias(mut self, bias: i32) -> Self {
        self.bias = bias;
        self
    }

    fn vote(&self, pointers: &[Point]) -> i32 {
        let inside = pointers
            .iter()
            .filter(|p| self.geometry.contains_point(**p))
            .count();
        self.bias + inside as i32
    }
}

pub fn select_output(candidates: &[Candidate], pointers: &[Point]) -> Option<OutputId> {
    match candidates {
        [] => None,
        [only] => Some(only.output),
        _ => {
            let mut best: Option<(OutputId, i32)> = None;
            for candidate in candidates {
                let vote = candidate.vote(pointers);
                if best.map_or(true, |(_, best_vote)| best_vote < vote) {
                    best = Some((candidate.output, vote));
                }
            }
            best.map(|(output, _)| output)
        }
    }
}
