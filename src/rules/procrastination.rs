//! Procrastination chain rule
//!
//! A run of consecutive avoidance actions earns a one-time bonus.

use crate::config::ProcrastinationChainConfig;
use crate::types::{ResolvedStep, TraitVector};
use std::collections::HashSet;

pub fn apply(
    acc: TraitVector,
    steps: &[ResolvedStep],
    cfg: &ProcrastinationChainConfig,
) -> TraitVector {
    let ids: HashSet<&str> = cfg.ids.iter().map(String::as_str).collect();
    let min_streak = cfg.min_streak();
    let mut streak = 0usize;

    for step in steps {
        if ids.contains(step.id()) {
            streak += 1;
            if streak >= min_streak {
                return acc.plus(&cfg.bonus);
            }
        } else {
            streak = 0;
        }
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::fixtures::{action, timeline};

    fn cfg(min_consecutive: usize) -> ProcrastinationChainConfig {
        ProcrastinationChainConfig {
            ids: vec!["phone".to_string(), "tv".to_string()],
            min_consecutive,
            bonus: TraitVector {
                c: -0.3,
                n: 0.1,
                ..TraitVector::ZERO
            },
        }
    }

    fn seq(ids: &[&str]) -> Vec<ResolvedStep> {
        timeline(ids.iter().map(|id| action(id, "sofa", 5.0, &[], false)).collect())
    }

    #[test]
    fn test_bonus_once_when_streak_reached() {
        let out = apply(TraitVector::ZERO, &seq(&["phone", "tv", "phone", "tv"]), &cfg(2));
        assert_eq!(out.c, -0.3);
        assert_eq!(out.n, 0.1);
    }

    #[test]
    fn test_interrupted_streak_resets() {
        let out = apply(TraitVector::ZERO, &seq(&["phone", "coffee", "tv", "coffee"]), &cfg(2));
        assert_eq!(out, TraitVector::ZERO);
    }

    #[test]
    fn test_longer_minimum() {
        let steps = seq(&["phone", "tv", "coffee", "tv", "phone", "tv"]);
        let out = apply(TraitVector::ZERO, &steps, &cfg(3));
        assert_eq!(out.c, -0.3);

        let short = seq(&["phone", "tv", "coffee"]);
        assert_eq!(apply(TraitVector::ZERO, &short, &cfg(3)), TraitVector::ZERO);
    }

    #[test]
    fn test_zero_minimum_uses_default() {
        let single = seq(&["phone", "coffee"]);
        assert_eq!(apply(TraitVector::ZERO, &single, &cfg(0)), TraitVector::ZERO);

        let pair = seq(&["phone", "tv"]);
        assert_eq!(apply(TraitVector::ZERO, &pair, &cfg(0)).c, -0.3);
    }
}
