//! Game decision rule
//!
//! The target action carries a "continue"/"stop" choice in its event
//! metadata; each branch has its own delta.

use crate::config::GameDecisionConfig;
use crate::types::{Event, ResolvedStep, TraitVector};
use serde_json::Value;

/// Metadata field holding the decision
pub const DECISION_FIELD: &str = "gameDecision";

/// Decision for a step: originating event's meta first, then the step's own
fn decision<'a>(step: &'a ResolvedStep, events: &'a [Event]) -> Option<&'a str> {
    events
        .get(step.source_index)
        .and_then(|e| e.meta_str(DECISION_FIELD))
        .filter(|d| !d.is_empty())
        .or_else(|| step.meta.get(DECISION_FIELD).and_then(Value::as_str))
}

pub fn apply(
    acc: TraitVector,
    steps: &[ResolvedStep],
    events: &[Event],
    cfg: &GameDecisionConfig,
) -> TraitVector {
    steps
        .iter()
        .filter(|s| s.id() == cfg.target_id)
        .fold(acc, |acc, step| match decision(step, events) {
            Some("continue") => acc.plus(&cfg.continue_delta),
            Some("stop") => acc.plus(&cfg.stop_delta),
            _ => acc,
        })
}
