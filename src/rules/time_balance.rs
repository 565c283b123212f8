//! Time balance rule
//!
//! Rewards a large share of planning/realistic time and penalizes a large
//! share of passive media time.

use crate::config::{PassiveRatioPenalty, PlanningRatioBonus, TimeBalanceConfig};
use crate::resolver::total_duration;
use crate::types::{ResolvedStep, TraitVector};
use std::collections::HashSet;

pub fn apply(acc: TraitVector, steps: &[ResolvedStep], cfg: &TimeBalanceConfig) -> TraitVector {
    let total = match total_duration(steps) {
        t if t == 0.0 => 1.0,
        t => t,
    };

    let acc = match &cfg.pln_real_ratio_bonus {
        Some(bonus) => apply_planning_bonus(acc, steps, total, bonus),
        None => acc,
    };
    match &cfg.passive_media_ratio_penalty {
        Some(penalty) => apply_passive_penalty(acc, steps, total, penalty),
        None => acc,
    }
}

fn apply_planning_bonus(
    acc: TraitVector,
    steps: &[ResolvedStep],
    total: f64,
    bonus: &PlanningRatioBonus,
) -> TraitVector {
    let Some(threshold) = bonus.threshold else {
        return acc;
    };
    let planned: f64 = steps
        .iter()
        .filter(|s| bonus.tags.iter().any(|t| s.def.has_tag(t)))
        .map(|s| s.dur)
        .sum();

    if planned / total >= threshold {
        acc.plus(&bonus.delta)
    } else {
        acc
    }
}

fn apply_passive_penalty(
    acc: TraitVector,
    steps: &[ResolvedStep],
    total: f64,
    penalty: &PassiveRatioPenalty,
) -> TraitVector {
    let Some(threshold) = penalty.threshold else {
        return acc;
    };
    let ids: HashSet<&str> = penalty.ids.iter().map(String::as_str).collect();
    let passive: f64 = steps
        .iter()
        .filter(|s| ids.contains(s.id()))
        .map(|s| s.dur)
        .sum();

    if passive / total >= threshold {
        acc.plus(&penalty.delta)
    } else {
        acc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::fixtures::{action, timeline};

    fn day() -> Vec<ResolvedStep> {
        timeline(vec![
            action("plan_day", "desk", 10.0, &["Pln"], false),
            action("cook", "kitchen", 10.0, &["Real", "Pln"], false),
            action("tv", "sofa", 20.0, &["Passive"], false),
        ])
    }

    fn cfg(bonus_threshold: Option<f64>, penalty_threshold: Option<f64>) -> TimeBalanceConfig {
        TimeBalanceConfig {
            pln_real_ratio_bonus: Some(PlanningRatioBonus {
                threshold: bonus_threshold,
                delta: TraitVector {
                    c: 0.3,
                    ..TraitVector::ZERO
                },
                tags: vec!["Pln".to_string(), "Real".to_string()],
            }),
            passive_media_ratio_penalty: Some(PassiveRatioPenalty {
                ids: vec!["tv".to_string()],
                threshold: penalty_threshold,
                delta: TraitVector {
                    c: -0.2,
                    o: -0.1,
                    ..TraitVector::ZERO
                },
            }),
        }
    }

    #[test]
    fn test_threshold_is_inclusive() {
        // Planning share is exactly 0.5, passive share exactly 0.5
        let out = apply(TraitVector::ZERO, &day(), &cfg(Some(0.5), Some(0.5)));
        assert!((out.c - 0.1).abs() < 1e-9);
        assert_eq!(out.o, -0.1);
    }

    #[test]
    fn test_below_threshold() {
        let out = apply(TraitVector::ZERO, &day(), &cfg(Some(0.6), Some(0.6)));
        assert_eq!(out, TraitVector::ZERO);
    }

    #[test]
    fn test_missing_threshold_disables_branch() {
        let out = apply(TraitVector::ZERO, &day(), &cfg(None, Some(0.1)));
        assert_eq!(out.c, -0.2);
    }

    #[test]
    fn test_empty_sequence_with_zero_threshold() {
        // Ratio is 0/1 = 0, which meets a zero threshold
        let out = apply(TraitVector::ZERO, &[], &cfg(Some(0.0), None));
        assert_eq!(out.c, 0.3);
    }
}
