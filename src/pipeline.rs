//! Scoring pipeline orchestration
//!
//! This module provides the public API for profile scoring. It runs the full
//! pipeline: events → resolver → accumulator → context rules → normalizer →
//! classifier.

use crate::accumulator::TraitAccumulator;
use crate::classifier::TypeClassifier;
use crate::error::ComputeError;
use crate::model::{Model, ModelLoader};
use crate::normalizer::TraitNormalizer;
use crate::resolver::{parse_events, resolve_sequence};
use crate::rules::{ContextRuleEngine, RuleInput};
use crate::types::ProfileResult;
use serde_json::Value;
use std::sync::Arc;

/// Score an event log against a model (pure function of its inputs).
///
/// # Arguments
/// * `events` - JSON array of `{ key, meta? }` objects
/// * `model` - Validated rule configuration
///
/// # Returns
/// The full profile: raw and scaled scores, resolved timeline and type
pub fn calc(events: &Value, model: &Model) -> Result<ProfileResult, ComputeError> {
    // Stage 1: Resolve events onto the catalog timeline
    let events = parse_events(events)?;
    let steps = resolve_sequence(&events, &model.catalog);

    // Stage 2: Accumulate tag and fixed contributions
    let raw = TraitAccumulator::accumulate(&steps, model);

    // Stage 3: Apply context rules in order
    let input = RuleInput {
        steps: &steps,
        events: &events,
    };
    let raw = ContextRuleEngine::apply(raw, &input, model);

    // Stage 4: Normalize to 0-100
    let scaled = TraitNormalizer::normalize(&raw);

    // Stage 5: Classify
    let mbti = TypeClassifier::classify(&scaled);

    tracing::debug!(
        model_version = %model.version,
        steps = steps.len(),
        type_code = %mbti.type_code,
        "scored event log"
    );

    Ok(ProfileResult {
        model_version: model.version.clone(),
        raw,
        scaled,
        resolved: steps,
        mbti,
    })
}

/// Score an event log given all inputs as JSON text (stateless, one-shot).
///
/// # Arguments
/// * `events_json` - JSON array of events
/// * `base_json` - Action catalog document
/// * `tuning_json` - Tuning document
///
/// # Returns
/// Profile JSON string
///
/// # Example
/// ```ignore
/// let profile_json = events_to_profile(events_json, base_json, tuning_json)?;
/// ```
pub fn events_to_profile(
    events_json: String,
    base_json: String,
    tuning_json: String,
) -> Result<String, ComputeError> {
    ProfileEngine::from_json(&base_json, &tuning_json)?.score_json(&events_json)
}

/// Scoring engine holding a shared, read-only model.
///
/// Cloning is cheap and clones share the model, so an engine can be handed
/// to several threads.
#[derive(Debug, Clone)]
pub struct ProfileEngine {
    model: Arc<Model>,
}

impl ProfileEngine {
    /// Create an engine around an already-built model
    pub fn new(model: Model) -> Self {
        Self {
            model: Arc::new(model),
        }
    }

    /// Create an engine sharing an existing model
    pub fn with_shared_model(model: Arc<Model>) -> Self {
        Self { model }
    }

    /// Build the model from the two documents given as JSON text
    pub fn from_json(base_json: &str, tuning_json: &str) -> Result<Self, ComputeError> {
        Ok(Self::new(Model::from_json(base_json, tuning_json)?))
    }

    /// Load the model from disk
    pub fn load(loader: &ModelLoader) -> Result<Self, ComputeError> {
        Ok(Self::new(loader.load()?))
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Score a parsed event array
    pub fn score(&self, events: &Value) -> Result<ProfileResult, ComputeError> {
        calc(events, &self.model)
    }

    /// Score an event array given as JSON text and return profile JSON
    pub fn score_json(&self, events_json: &str) -> Result<String, ComputeError> {
        let events: Value = serde_json::from_str(events_json)?;
        let profile = self.score(&events)?;
        serde_json::to_string(&profile)
            .map_err(|e| ComputeError::EncodingError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn base_json() -> &'static str {
        r#"{
            "actions": [
                { "id": "wake_snooze", "scene": "wake", "duration_min": 10, "tags": ["Turbulent"], "break": false },
                { "id": "wake_up", "scene": "wake", "duration_min": 5, "tags": [], "break": true },
                { "id": "make_coffee", "alias": "Make coffee", "scene": "kitchen", "duration_min": 5, "tags": ["Real"] }
            ]
        }"#
    }

    fn tuning_json() -> &'static str {
        r#"{
            "version": "2.0.1",
            "time_base_min": 10,
            "matrix": { "Turbulent": { "N": 0.1 }, "Real": { "C": 0.2 } },
            "context_rules": { "wake_delay": { "N_per_min": 0.05 } }
        }"#
    }

    fn engine() -> ProfileEngine {
        ProfileEngine::from_json(base_json(), tuning_json()).unwrap()
    }

    #[test]
    fn test_empty_events_give_neutral_profile() {
        let profile = engine().score(&json!([])).unwrap();

        assert_eq!(profile.model_version, "2.0.1");
        assert_eq!(profile.raw, crate::types::TraitVector::ZERO);
        assert_eq!(profile.scaled, crate::types::TraitVector::splat(50.0));
        assert!(profile.resolved.is_empty());
        assert_eq!(profile.mbti.type_code, "ENTP");
    }

    #[test]
    fn test_wake_delay_contributes_before_squash() {
        let events = json!([{ "key": "wake_snooze" }, { "key": "wake_snooze" }, { "key": "wake_up" }]);
        let profile = engine().score(&events).unwrap();

        // Tags: 2 * (10/10) * 0.1 = 0.2; wake delay: 20 min * 0.05 = 1.0
        assert!((profile.raw.n - 1.2).abs() < 1e-9);
        assert_eq!(profile.resolved.len(), 3);
    }

    #[test]
    fn test_non_array_events_fail() {
        let err = engine().score(&json!({ "events": [] })).unwrap_err();
        assert!(matches!(err, ComputeError::Validation(_)));
    }

    #[test]
    fn test_score_json_wire_format() {
        let out = engine()
            .score_json(r#"[{ "key": "Make   coffee" }, { "key": "nope" }]"#)
            .unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();

        assert_eq!(value["modelVersion"], "2.0.1");
        assert!(value["raw"]["C"].is_number());
        assert!(value["scaled"]["O"].is_number());
        assert_eq!(value["resolved"][0]["def"]["id"], "make_coffee");
        assert_eq!(value["resolved"][0]["dur"], 5.0);
        assert_eq!(value["resolved"][0]["start"], 0.0);
        assert!(value["resolved"][0].get("meta").is_none());
        assert_eq!(value["mbti"]["type"].as_str().unwrap().len(), 4);
        assert!(value["mbti"]["confidence"]["overall"].is_number());
    }

    #[test]
    fn test_stateless_entry_point() {
        let out = events_to_profile(
            r#"[{ "key": "wake_up" }]"#.to_string(),
            base_json().to_string(),
            tuning_json().to_string(),
        )
        .unwrap();
        assert!(out.contains("\"modelVersion\":\"2.0.1\""));
    }

    #[test]
    fn test_invalid_events_json() {
        // Malformed input is a JSON error; EncodingError is reserved for output
        let err = engine().score_json("not json").unwrap_err();
        assert!(matches!(err, ComputeError::JsonError(_)));
    }

    #[test]
    fn test_engine_shared_across_threads() {
        let engine = engine();
        let events = json!([{ "key": "make_coffee" }, { "key": "wake_snooze" }]);
        let expected = engine.score(&events).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let engine = engine.clone();
                let events = events.clone();
                std::thread::spawn(move || engine.score(&events).unwrap())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    }
}
