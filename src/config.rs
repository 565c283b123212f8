//! Typed configuration schema
//!
//! Two JSON documents make up a model: the action catalog ("base") and the
//! tuning rules. Every optional rule section is an `Option`, so an absent
//! section turns the corresponding context rule into a no-op.

use crate::types::{TraitCaps, TraitVector};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Action catalog document (`setting.base.json`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionCatalogDocument {
    pub actions: Vec<ActionSpec>,
    #[serde(default)]
    pub scenes: Map<String, Value>,
}

/// One catalog entry as written in the base document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionSpec {
    pub id: String,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub scene: String,
    pub duration_min: f64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, rename = "break")]
    pub is_break: bool,
    #[serde(default)]
    pub fixed_deltas: Option<TraitVector>,
}

/// Tuning document (`settings.tuning.json`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TuningDocument {
    #[serde(default = "default_version")]
    pub version: String,
    pub time_base_min: f64,
    pub matrix: HashMap<String, TraitVector>,
    #[serde(default)]
    pub actions_fixed: Vec<FixedDeltaOverride>,
    #[serde(default)]
    pub context_rules: ContextRulesConfig,
    #[serde(default)]
    pub scenarios: Vec<ScenarioConfig>,
}

fn default_version() -> String {
    "0.0.0".to_string()
}

/// Per-action flat adjustment supplied by the tuning document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixedDeltaOverride {
    pub id: String,
    #[serde(default)]
    pub fixed_deltas: TraitVector,
}

/// Configuration for the eight context rules
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextRulesConfig {
    #[serde(default)]
    pub wake_delay: Option<WakeDelayConfig>,
    #[serde(default)]
    pub procrastination_chain: Option<ProcrastinationChainConfig>,
    #[serde(default)]
    pub game_decision: Option<GameDecisionConfig>,
    #[serde(default)]
    pub scene_switch: Option<SceneSwitchConfig>,
    #[serde(default)]
    pub time_balance: Option<TimeBalanceConfig>,
    #[serde(default)]
    pub consistency_entropy: Option<ConsistencyEntropyConfig>,
    #[serde(default)]
    pub instant_break: Option<InstantBreakConfig>,
}

impl ContextRulesConfig {
    /// Names of the configured rule sections, in evaluation order
    pub fn configured(&self) -> Vec<&'static str> {
        [
            ("wake_delay", self.wake_delay.is_some()),
            ("procrastination_chain", self.procrastination_chain.is_some()),
            ("game_decision", self.game_decision.is_some()),
            ("scene_switch", self.scene_switch.is_some()),
            ("time_balance", self.time_balance.is_some()),
            ("consistency_entropy", self.consistency_entropy.is_some()),
            ("instant_break", self.instant_break.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, present)| present.then_some(name))
        .collect()
    }
}

/// Wake delay: minutes before the first wake-scene break step
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WakeDelayConfig {
    /// Neuroticism per minute of delay; the rule is inert without it
    #[serde(default, rename = "N_per_min")]
    pub n_per_min: Option<f64>,
    #[serde(default, rename = "N_cap")]
    pub n_cap: Option<f64>,
    #[serde(default, rename = "C_per_min")]
    pub c_per_min: Option<f64>,
    #[serde(default, rename = "C_cap")]
    pub c_cap: Option<f64>,
}

/// Procrastination chain: a run of "avoidance" actions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcrastinationChainConfig {
    #[serde(default)]
    pub ids: Vec<String>,
    #[serde(default = "default_min_consecutive")]
    pub min_consecutive: usize,
    #[serde(default)]
    pub bonus: TraitVector,
}

fn default_min_consecutive() -> usize {
    2
}

impl ProcrastinationChainConfig {
    /// Streak length that triggers the bonus; zero falls back to the default
    pub fn min_streak(&self) -> usize {
        match self.min_consecutive {
            0 => default_min_consecutive(),
            n => n,
        }
    }
}

/// Game decision: branch delta keyed on a metadata decision
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameDecisionConfig {
    pub target_id: String,
    #[serde(default)]
    pub continue_delta: TraitVector,
    #[serde(default)]
    pub stop_delta: TraitVector,
}

/// Scene switch: per-transition increments with one-sided caps
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneSwitchConfig {
    #[serde(default)]
    pub per_switch: TraitVector,
    #[serde(default)]
    pub caps: TraitCaps,
}

/// Time balance: duration-share bonus and penalty
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeBalanceConfig {
    #[serde(default)]
    pub pln_real_ratio_bonus: Option<PlanningRatioBonus>,
    #[serde(default)]
    pub passive_media_ratio_penalty: Option<PassiveRatioPenalty>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanningRatioBonus {
    #[serde(default)]
    pub threshold: Option<f64>,
    #[serde(default)]
    pub delta: TraitVector,
    /// Tags counted as planning/realistic time
    #[serde(default = "default_planning_tags")]
    pub tags: Vec<String>,
}

fn default_planning_tags() -> Vec<String> {
    vec!["Pln".to_string(), "Real".to_string()]
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PassiveRatioPenalty {
    #[serde(default)]
    pub ids: Vec<String>,
    #[serde(default)]
    pub threshold: Option<f64>,
    #[serde(default)]
    pub delta: TraitVector,
}

/// Consistency: normalized Shannon entropy over a tag subset
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsistencyEntropyConfig {
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, rename = "C_gain")]
    pub c_gain: Option<f64>,
    #[serde(default, rename = "O_gain")]
    pub o_gain: Option<f64>,
}

/// Instant break: short rest actions with decay, burst and novelty bonuses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstantBreakConfig {
    #[serde(default = "default_break_threshold_min")]
    pub threshold_min: f64,
    /// Applied to O, C and E only, scaled by `1/sqrt(hits)`
    #[serde(default)]
    pub per_hit_delta: TraitVector,
    #[serde(default)]
    pub burst: Option<BurstConfig>,
    #[serde(default)]
    pub novel_tag_bonus: Option<NovelTagBonus>,
    /// O and E are upper caps, C is a lower cap
    #[serde(default)]
    pub caps: TraitCaps,
    #[serde(default)]
    pub over_sampling_guard: Option<OverSamplingGuard>,
}

fn default_break_threshold_min() -> f64 {
    2.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BurstConfig {
    #[serde(default = "default_burst_window_min")]
    pub window_min: f64,
    /// Fires when the windowed hit count equals this value exactly
    #[serde(default = "default_burst_min_hits")]
    pub min_hits: usize,
    #[serde(default)]
    pub bonus: TraitVector,
}

fn default_burst_window_min() -> f64 {
    10.0
}

fn default_burst_min_hits() -> usize {
    3
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NovelTagBonus {
    #[serde(default)]
    pub per_new_tag: f64,
    #[serde(default)]
    pub cap: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverSamplingGuard {
    #[serde(default)]
    pub avg_stay_min_lt: Option<f64>,
    #[serde(default)]
    pub min_hits: Option<usize>,
    #[serde(default)]
    pub penalty: TraitVector,
}

/// Pattern-matching bonus over the joined sequence of action ids
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub expr: String,
    #[serde(default)]
    pub time_limits: Option<TimeLimits>,
    #[serde(default)]
    pub base_bonus: TraitVector,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeLimits {
    #[serde(default)]
    pub total_minutes: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_absent_sections_are_none() {
        let rules: ContextRulesConfig = serde_json::from_value(json!({})).unwrap();
        assert!(rules.wake_delay.is_none());
        assert!(rules.instant_break.is_none());
        assert!(rules.configured().is_empty());
    }

    #[test]
    fn test_rule_defaults() {
        let rules: ContextRulesConfig = serde_json::from_value(json!({
            "procrastination_chain": { "ids": ["sofa_phone"] },
            "instant_break": { "burst": {} },
            "time_balance": { "pln_real_ratio_bonus": { "threshold": 0.3 } }
        }))
        .unwrap();

        assert_eq!(rules.procrastination_chain.unwrap().min_consecutive, 2);

        let ib = rules.instant_break.unwrap();
        assert_eq!(ib.threshold_min, 2.0);
        let burst = ib.burst.unwrap();
        assert_eq!(burst.window_min, 10.0);
        assert_eq!(burst.min_hits, 3);

        let bonus = rules.time_balance.unwrap().pln_real_ratio_bonus.unwrap();
        assert_eq!(bonus.tags, vec!["Pln".to_string(), "Real".to_string()]);
    }

    #[test]
    fn test_wake_delay_field_names() {
        let cfg: WakeDelayConfig = serde_json::from_value(json!({
            "N_per_min": 0.05, "N_cap": 1.5, "C_per_min": -0.02
        }))
        .unwrap();
        assert_eq!(cfg.n_per_min, Some(0.05));
        assert_eq!(cfg.n_cap, Some(1.5));
        assert_eq!(cfg.c_per_min, Some(-0.02));
        assert_eq!(cfg.c_cap, None);
    }

    #[test]
    fn test_tuning_version_default() {
        let doc: TuningDocument = serde_json::from_value(json!({
            "time_base_min": 10,
            "matrix": {}
        }))
        .unwrap();
        assert_eq!(doc.version, "0.0.0");
        assert!(doc.scenarios.is_empty());
    }
}
