//! Instant break rule
//!
//! Short break actions ("hits") nudge O, C and E with diminishing returns.
//! Clusters of hits inside a sliding window earn a burst bonus, a hit followed
//! by a step with unseen tags earns an Openness bonus, and an over-sampling
//! guard penalizes sequences made of many tiny steps.

use crate::config::InstantBreakConfig;
use crate::resolver::total_duration;
use crate::types::{ResolvedStep, TraitVector};
use std::collections::HashSet;

pub fn apply(acc: TraitVector, steps: &[ResolvedStep], cfg: &InstantBreakConfig) -> TraitVector {
    let mut out = acc;
    let mut hits = 0usize;
    let mut hit_starts: Vec<f64> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for (i, step) in steps.iter().enumerate() {
        if step.def.is_break && step.dur <= cfg.threshold_min {
            hits += 1;
            hit_starts.push(step.start);

            let decay = 1.0 / (hits as f64).sqrt();
            out.o += cfg.per_hit_delta.o * decay;
            out.c += cfg.per_hit_delta.c * decay;
            out.e += cfg.per_hit_delta.e * decay;

            if let Some(burst) = &cfg.burst {
                let window_start = step.start - burst.window_min;
                let in_window = hit_starts.iter().filter(|&&t| t >= window_start).count();
                if in_window == burst.min_hits {
                    out = out.plus(&burst.bonus);
                }
            }

            if let (Some(next), Some(novel)) = (steps.get(i + 1), &cfg.novel_tag_bonus) {
                let new_tags = next
                    .def
                    .tags
                    .iter()
                    .filter(|t| !seen.contains(t.as_str()))
                    .count();
                let bonus = novel.per_new_tag * new_tags as f64;
                out.o += novel.cap.map_or(bonus, |cap| bonus.min(cap));
            }
        }
        seen.extend(step.def.tags.iter().map(String::as_str));
    }

    if let Some(cap) = cfg.caps.o {
        out.o = out.o.min(cap);
    }
    if let Some(cap) = cfg.caps.c {
        out.c = out.c.max(cap);
    }
    if let Some(cap) = cfg.caps.e {
        out.e = out.e.min(cap);
    }

    if let Some(guard) = &cfg.over_sampling_guard {
        if let (Some(avg_lt), Some(min_hits)) = (guard.avg_stay_min_lt, guard.min_hits) {
            let avg_stay = total_duration(steps) / steps.len().max(1) as f64;
            if avg_stay < avg_lt && hits >= min_hits {
                tracing::debug!(avg_stay, hits, "over-sampling guard triggered");
                out = out.plus(&guard.penalty);
            }
        }
    }

    out
}
