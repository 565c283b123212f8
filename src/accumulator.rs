//! Trait accumulation
//!
//! Sums per-tag matrix contributions and per-action fixed deltas, each scaled
//! by the step's duration in units of `time_base_min`.

use crate::model::Model;
use crate::types::{ResolvedStep, TraitVector};

/// Raw score accumulator
pub struct TraitAccumulator;

impl TraitAccumulator {
    /// Accumulate raw trait scores over the resolved sequence
    pub fn accumulate(steps: &[ResolvedStep], model: &Model) -> TraitVector {
        steps
            .iter()
            .fold(TraitVector::ZERO, |acc, step| {
                acc.plus(&step_contribution(step, model))
            })
    }
}

/// Contribution of one step: `scale * (Σ matrix[tag] + fixed_deltas)`
fn step_contribution(step: &ResolvedStep, model: &Model) -> TraitVector {
    let scale = step.dur / model.time_base_min;
    step.def
        .tags
        .iter()
        .fold(TraitVector::ZERO, |acc, tag| {
            acc.plus_scaled(&model.matrix_row(tag), scale)
        })
        .plus_scaled(&step.def.fixed_deltas, scale)
}
