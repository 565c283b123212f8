//! Context rule battery
//!
//! Eight adjustment rules run after accumulation, always in the order given
//! by [`ContextRule::ORDER`]. Each rule is a pure function from the current
//! accumulator to the next one; a rule whose configuration section is absent
//! returns its input unchanged.

pub mod consistency;
pub mod game_decision;
pub mod instant_break;
pub mod procrastination;
pub mod scenarios;
pub mod scene_switch;
pub mod time_balance;
pub mod wake_delay;

use crate::model::Model;
use crate::types::{Event, ResolvedStep, TraitVector};

/// Everything a rule may read besides the accumulator
#[derive(Debug, Clone, Copy)]
pub struct RuleInput<'a> {
    pub steps: &'a [ResolvedStep],
    pub events: &'a [Event],
}

/// One context rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextRule {
    WakeDelay,
    ProcrastinationChain,
    GameDecision,
    SceneSwitch,
    TimeBalance,
    ConsistencyEntropy,
    InstantBreak,
    Scenarios,
}

impl ContextRule {
    /// Evaluation order
    pub const ORDER: [ContextRule; 8] = [
        ContextRule::WakeDelay,
        ContextRule::ProcrastinationChain,
        ContextRule::GameDecision,
        ContextRule::SceneSwitch,
        ContextRule::TimeBalance,
        ContextRule::ConsistencyEntropy,
        ContextRule::InstantBreak,
        ContextRule::Scenarios,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ContextRule::WakeDelay => "wake_delay",
            ContextRule::ProcrastinationChain => "procrastination_chain",
            ContextRule::GameDecision => "game_decision",
            ContextRule::SceneSwitch => "scene_switch",
            ContextRule::TimeBalance => "time_balance",
            ContextRule::ConsistencyEntropy => "consistency_entropy",
            ContextRule::InstantBreak => "instant_break",
            ContextRule::Scenarios => "scenarios",
        }
    }

    /// Apply this rule with its section of the model's configuration
    pub fn apply(self, acc: TraitVector, input: &RuleInput<'_>, model: &Model) -> TraitVector {
        let rules = &model.context_rules;
        match self {
            ContextRule::WakeDelay => rules
                .wake_delay
                .as_ref()
                .map_or(acc, |cfg| wake_delay::apply(acc, input.steps, cfg)),
            ContextRule::ProcrastinationChain => rules
                .procrastination_chain
                .as_ref()
                .map_or(acc, |cfg| procrastination::apply(acc, input.steps, cfg)),
            ContextRule::GameDecision => rules.game_decision.as_ref().map_or(acc, |cfg| {
                game_decision::apply(acc, input.steps, input.events, cfg)
            }),
            ContextRule::SceneSwitch => rules
                .scene_switch
                .as_ref()
                .map_or(acc, |cfg| scene_switch::apply(acc, input.steps, cfg)),
            ContextRule::TimeBalance => rules
                .time_balance
                .as_ref()
                .map_or(acc, |cfg| time_balance::apply(acc, input.steps, cfg)),
            ContextRule::ConsistencyEntropy => rules
                .consistency_entropy
                .as_ref()
                .map_or(acc, |cfg| consistency::apply(acc, input.steps, cfg)),
            ContextRule::InstantBreak => rules
                .instant_break
                .as_ref()
                .map_or(acc, |cfg| instant_break::apply(acc, input.steps, cfg)),
            ContextRule::Scenarios => scenarios::apply(acc, input.steps, &model.scenarios),
        }
    }
}

/// Runs the rule battery
pub struct ContextRuleEngine;

impl ContextRuleEngine {
    /// Apply all rules in the fixed order
    pub fn apply(acc: TraitVector, input: &RuleInput<'_>, model: &Model) -> TraitVector {
        Self::apply_in_order(&ContextRule::ORDER, acc, input, model)
    }

    /// Apply an explicit rule sequence
    pub fn apply_in_order(
        order: &[ContextRule],
        acc: TraitVector,
        input: &RuleInput<'_>,
        model: &Model,
    ) -> TraitVector {
        order.iter().fold(acc, |acc, rule| {
            let next = rule.apply(acc, input, model);
            if next != acc {
                tracing::debug!(
                    rule = rule.name(),
                    d_o = next.o - acc.o,
                    d_c = next.c - acc.c,
                    d_e = next.e - acc.e,
                    d_a = next.a - acc.a,
                    d_n = next.n - acc.n,
                    "context rule adjusted scores"
                );
            }
            next
        })
    }
}

/// `max(lo, min(hi, x))`; never panics on inverted bounds
pub(crate) fn clamp(x: f64, lo: f64, hi: f64) -> f64 {
    x.min(hi).max(lo)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::types::{ActionDefinition, ResolvedStep, TraitVector};
    use serde_json::Map;
    use std::sync::Arc;

    /// Catalog action for rule tests
    pub fn action(id: &str, scene: &str, dur: f64, tags: &[&str], is_break: bool) -> ActionDefinition {
        ActionDefinition {
            id: id.to_string(),
            alias: None,
            scene: scene.to_string(),
            duration_min: dur,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            is_break,
            fixed_deltas: TraitVector::ZERO,
        }
    }

    /// Lay actions out back-to-back, one event per step
    pub fn timeline(actions: Vec<ActionDefinition>) -> Vec<ResolvedStep> {
        let mut cursor = 0.0;
        actions
            .into_iter()
            .enumerate()
            .map(|(source_index, def)| {
                let dur = def.duration_min;
                let start = cursor;
                cursor += dur;
                ResolvedStep {
                    def: Arc::new(def),
                    dur,
                    start,
                    meta: Map::new(),
                    source_index,
                }
            })
            .collect()
    }

    pub fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }
}
