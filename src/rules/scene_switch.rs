//! Scene switch rule
//!
//! Counts scene transitions between adjacent steps. O, E and A may only
//! increase (capped from above); C and N may only decrease (capped from below).

use super::clamp;
use crate::config::SceneSwitchConfig;
use crate::types::{ResolvedStep, Trait, TraitVector};

/// Number of adjacent steps whose scene label differs
pub fn count_switches(steps: &[ResolvedStep]) -> usize {
    steps
        .windows(2)
        .filter(|pair| pair[0].scene() != pair[1].scene())
        .count()
}

fn only_increases(t: Trait) -> bool {
    matches!(
        t,
        Trait::Openness | Trait::Extraversion | Trait::Agreeableness
    )
}

pub fn apply(acc: TraitVector, steps: &[ResolvedStep], cfg: &SceneSwitchConfig) -> TraitVector {
    let switches = count_switches(steps) as f64;
    let mut out = acc;

    for t in Trait::ALL {
        let per = cfg.per_switch[t];
        if per == 0.0 {
            continue;
        }
        let cap = cfg.caps.get(t);
        let delta = if only_increases(t) {
            clamp(switches * per, 0.0, cap.unwrap_or(f64::INFINITY))
        } else {
            clamp(switches * per, cap.unwrap_or(f64::NEG_INFINITY), 0.0)
        };
        out[t] += delta;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::fixtures::{action, approx, timeline};
    use crate::types::TraitCaps;

    fn hopping() -> Vec<ResolvedStep> {
        timeline(vec![
            action("wake_up", "wake", 5.0, &[], true),
            action("coffee", "kitchen", 5.0, &[], false),
            action("toast", "kitchen", 5.0, &[], false),
            action("tv", "sofa", 5.0, &[], false),
            action("email", "computer", 5.0, &[], false),
        ])
    }

    #[test]
    fn test_count_switches() {
        assert_eq!(count_switches(&hopping()), 3);
        assert_eq!(count_switches(&[]), 0);
    }

    #[test]
    fn test_increments_and_caps() {
        let cfg = SceneSwitchConfig {
            per_switch: TraitVector {
                o: 0.1,
                c: -0.1,
                e: 0.2,
                ..TraitVector::ZERO
            },
            caps: TraitCaps {
                e: Some(0.5),
                c: Some(-0.2),
                ..Default::default()
            },
        };
        let out = apply(TraitVector::ZERO, &hopping(), &cfg);

        assert!(approx(out.o, 0.3));
        assert!(approx(out.e, 0.5));
        assert!(approx(out.c, -0.2));
        assert_eq!(out.a, 0.0);
        assert_eq!(out.n, 0.0);
    }

    #[test]
    fn test_wrong_sign_is_clamped_away() {
        let cfg = SceneSwitchConfig {
            per_switch: TraitVector {
                o: -0.1,
                n: 0.1,
                ..TraitVector::ZERO
            },
            caps: TraitCaps::default(),
        };
        assert_eq!(apply(TraitVector::ZERO, &hopping(), &cfg), TraitVector::ZERO);
    }
}
