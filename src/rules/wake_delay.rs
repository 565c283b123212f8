//! Wake delay rule
//!
//! Time spent before actually getting up raises Neuroticism and, optionally,
//! lowers Conscientiousness.

use super::clamp;
use crate::config::WakeDelayConfig;
use crate::types::{ResolvedStep, TraitVector};

/// Scene label of the wake-up phase
pub const WAKE_SCENE: &str = "wake";

/// Minutes elapsed before the first wake-scene break step; the whole log when
/// there is none
pub fn wake_delay_minutes(steps: &[ResolvedStep]) -> f64 {
    steps
        .iter()
        .take_while(|s| !(s.scene() == WAKE_SCENE && s.def.is_break))
        .map(|s| s.dur)
        .sum()
}

pub fn apply(acc: TraitVector, steps: &[ResolvedStep], cfg: &WakeDelayConfig) -> TraitVector {
    let Some(n_per_min) = cfg.n_per_min else {
        return acc;
    };
    let delay = wake_delay_minutes(steps);
    if delay <= 0.0 {
        return acc;
    }

    let mut out = acc;
    out.n += clamp(delay * n_per_min, 0.0, cfg.n_cap.unwrap_or(f64::INFINITY));
    if let Some(c_per_min) = cfg.c_per_min {
        out.c += clamp(
            delay * c_per_min,
            cfg.c_cap.unwrap_or(f64::NEG_INFINITY),
            0.0,
        );
    }
    out
}
