//! Consistency rule
//!
//! Duration-weighted Shannon entropy over a configured tag subset. A focused
//! routine (low entropy) raises Conscientiousness; a varied one raises
//! Openness.

use crate::config::ConsistencyEntropyConfig;
use crate::types::{ResolvedStep, TraitVector};

/// Consistency in [0, 1]: one minus the normalized entropy
pub fn consistency(steps: &[ResolvedStep], tags: &[String]) -> f64 {
    let mut buckets: Vec<(&str, f64)> = Vec::with_capacity(tags.len());
    for tag in tags {
        if !buckets.iter().any(|(t, _)| *t == tag.as_str()) {
            buckets.push((tag.as_str(), 0.0));
        }
    }

    for step in steps {
        for tag in &step.def.tags {
            if let Some(bucket) = buckets.iter_mut().find(|(t, _)| *t == tag.as_str()) {
                bucket.1 += step.dur;
            }
        }
    }

    let total = match buckets.iter().map(|(_, v)| v).sum::<f64>() {
        t if t == 0.0 => 1.0,
        t => t,
    };
    let entropy: f64 = -buckets
        .iter()
        .map(|(_, v)| v / total)
        .filter(|&p| p > 0.0)
        .map(|p| p * p.ln())
        .sum::<f64>();

    // A single bucket cannot be inconsistent
    let k = tags.len().max(1) as f64;
    let normalized = if k > 1.0 { entropy / k.ln() } else { 0.0 };
    (1.0 - normalized).clamp(0.0, 1.0)
}

pub fn apply(
    acc: TraitVector,
    steps: &[ResolvedStep],
    cfg: &ConsistencyEntropyConfig,
) -> TraitVector {
    let consistency = consistency(steps, &cfg.tags);
    let mut out = acc;
    if let Some(c_gain) = cfg.c_gain {
        out.c += c_gain * consistency;
    }
    if let Some(o_gain) = cfg.o_gain {
        out.o += o_gain * (1.0 - consistency);
    }
    out
}
