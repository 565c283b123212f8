//! Scenario rule
//!
//! Regex patterns matched against the space-joined sequence of action ids.
//! Every matching scenario within its time limit applies its bonus.

use crate::model::CompiledScenario;
use crate::resolver::total_duration;
use crate::types::{ResolvedStep, TraitVector};

/// Action ids joined by single spaces, in sequence order
pub fn joined_ids(steps: &[ResolvedStep]) -> String {
    steps
        .iter()
        .map(ResolvedStep::id)
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn apply(
    acc: TraitVector,
    steps: &[ResolvedStep],
    scenarios: &[CompiledScenario],
) -> TraitVector {
    if scenarios.is_empty() {
        return acc;
    }
    let joined = joined_ids(steps);
    let total = total_duration(steps);

    scenarios.iter().fold(acc, |acc, sc| {
        if !sc.pattern.is_match(&joined) {
            return acc;
        }
        if sc.total_minutes_limit.is_some_and(|limit| total > limit) {
            return acc;
        }
        tracing::debug!(
            scenario = sc.name.as_deref().unwrap_or(sc.pattern.as_str()),
            "scenario matched"
        );
        acc.plus(&sc.bonus)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::fixtures::{action, approx, timeline};
    use regex::Regex;

    fn scenario(expr: &str, limit: Option<f64>, o: f64) -> CompiledScenario {
        CompiledScenario {
            name: None,
            pattern: Regex::new(expr).unwrap(),
            total_minutes_limit: limit,
            bonus: TraitVector {
                o,
                ..TraitVector::ZERO
            },
        }
    }

    fn morning() -> Vec<ResolvedStep> {
        timeline(vec![
            action("wake_up", "wake", 5.0, &[], true),
            action("coffee", "kitchen", 5.0, &[], false),
            action("read_news", "sofa", 15.0, &[], false),
        ])
    }

    #[test]
    fn test_joined_ids() {
        assert_eq!(joined_ids(&morning()), "wake_up coffee read_news");
        assert_eq!(joined_ids(&[]), "");
    }

    #[test]
    fn test_all_matching_scenarios_apply() {
        let scenarios = vec![
            scenario(r"^wake_up coffee", None, 0.1),
            scenario(r"read_news$", None, 0.2),
            scenario(r"tv", None, 5.0),
        ];
        let out = apply(TraitVector::ZERO, &morning(), &scenarios);
        assert!(approx(out.o, 0.3));
    }

    #[test]
    fn test_time_limit() {
        // Total is 25 minutes
        let within = vec![scenario("coffee", Some(25.0), 0.1)];
        assert!(approx(apply(TraitVector::ZERO, &morning(), &within).o, 0.1));

        let over = vec![scenario("coffee", Some(20.0), 0.1)];
        assert_eq!(apply(TraitVector::ZERO, &morning(), &over).o, 0.0);
    }

    #[test]
    fn test_empty_sequence_can_match_empty_pattern() {
        let scenarios = vec![scenario("^$", None, 0.4)];
        assert!(approx(apply(TraitVector::ZERO, &[], &scenarios).o, 0.4));
    }
}
