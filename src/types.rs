//! Core data types for Persona Flux
//!
//! This module defines the types that flow through the scoring pipeline:
//! raw events, catalog actions, resolved steps, trait vectors and the final
//! profile handed to downstream collaborators.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::ops::{Index, IndexMut};
use std::sync::Arc;

/// Big Five trait axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trait {
    #[serde(rename = "O")]
    Openness,
    #[serde(rename = "C")]
    Conscientiousness,
    #[serde(rename = "E")]
    Extraversion,
    #[serde(rename = "A")]
    Agreeableness,
    #[serde(rename = "N")]
    Neuroticism,
}

impl Trait {
    /// All traits in canonical OCEAN order
    pub const ALL: [Trait; 5] = [
        Trait::Openness,
        Trait::Conscientiousness,
        Trait::Extraversion,
        Trait::Agreeableness,
        Trait::Neuroticism,
    ];

    /// Single-letter code used on the wire
    pub fn code(self) -> &'static str {
        match self {
            Trait::Openness => "O",
            Trait::Conscientiousness => "C",
            Trait::Extraversion => "E",
            Trait::Agreeableness => "A",
            Trait::Neuroticism => "N",
        }
    }
}

impl fmt::Display for Trait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Five-dimensional trait vector.
///
/// Used both as the unbounded raw accumulator and as a per-trait delta in the
/// tuning configuration. Missing fields deserialize to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraitVector {
    #[serde(rename = "O")]
    pub o: f64,
    #[serde(rename = "C")]
    pub c: f64,
    #[serde(rename = "E")]
    pub e: f64,
    #[serde(rename = "A")]
    pub a: f64,
    #[serde(rename = "N")]
    pub n: f64,
}

impl TraitVector {
    pub const ZERO: TraitVector = TraitVector {
        o: 0.0,
        c: 0.0,
        e: 0.0,
        a: 0.0,
        n: 0.0,
    };

    /// Build a vector with the same value on every axis
    pub fn splat(value: f64) -> Self {
        Self {
            o: value,
            c: value,
            e: value,
            a: value,
            n: value,
        }
    }

    /// Component-wise sum
    pub fn plus(self, other: &TraitVector) -> Self {
        self.zip_with(other, |a, b| a + b)
    }

    /// Add `factor * other` component-wise
    pub fn plus_scaled(self, other: &TraitVector, factor: f64) -> Self {
        self.zip_with(other, |a, b| a + factor * b)
    }

    /// Apply `f` to every component
    pub fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            o: f(self.o),
            c: f(self.c),
            e: f(self.e),
            a: f(self.a),
            n: f(self.n),
        }
    }

    fn zip_with(self, other: &TraitVector, f: impl Fn(f64, f64) -> f64) -> Self {
        Self {
            o: f(self.o, other.o),
            c: f(self.c, other.c),
            e: f(self.e, other.e),
            a: f(self.a, other.a),
            n: f(self.n, other.n),
        }
    }

    /// Iterate `(trait, value)` pairs in OCEAN order
    pub fn iter(&self) -> impl Iterator<Item = (Trait, f64)> + '_ {
        Trait::ALL.into_iter().map(move |t| (t, self[t]))
    }
}

impl Index<Trait> for TraitVector {
    type Output = f64;

    fn index(&self, t: Trait) -> &f64 {
        match t {
            Trait::Openness => &self.o,
            Trait::Conscientiousness => &self.c,
            Trait::Extraversion => &self.e,
            Trait::Agreeableness => &self.a,
            Trait::Neuroticism => &self.n,
        }
    }
}

impl IndexMut<Trait> for TraitVector {
    fn index_mut(&mut self, t: Trait) -> &mut f64 {
        match t {
            Trait::Openness => &mut self.o,
            Trait::Conscientiousness => &mut self.c,
            Trait::Extraversion => &mut self.e,
            Trait::Agreeableness => &mut self.a,
            Trait::Neuroticism => &mut self.n,
        }
    }
}

/// Optional per-trait bound. An absent entry means "unbounded" on that axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraitCaps {
    #[serde(rename = "O", skip_serializing_if = "Option::is_none")]
    pub o: Option<f64>,
    #[serde(rename = "C", skip_serializing_if = "Option::is_none")]
    pub c: Option<f64>,
    #[serde(rename = "E", skip_serializing_if = "Option::is_none")]
    pub e: Option<f64>,
    #[serde(rename = "A", skip_serializing_if = "Option::is_none")]
    pub a: Option<f64>,
    #[serde(rename = "N", skip_serializing_if = "Option::is_none")]
    pub n: Option<f64>,
}

impl TraitCaps {
    pub fn get(&self, t: Trait) -> Option<f64> {
        match t {
            Trait::Openness => self.o,
            Trait::Conscientiousness => self.c,
            Trait::Extraversion => self.e,
            Trait::Agreeableness => self.a,
            Trait::Neuroticism => self.n,
        }
    }
}

/// Raw input event.
///
/// Events are parsed leniently: a missing or non-string `key` yields
/// `key: None` and the event is later skipped by the resolver. A missing or
/// non-object `meta` yields an empty map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Event {
    pub key: Option<String>,
    pub meta: Map<String, Value>,
}

impl Event {
    /// Create an event with the given key and no metadata
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            meta: Map::new(),
        }
    }

    /// Attach a metadata field
    pub fn with_meta(mut self, field: impl Into<String>, value: Value) -> Self {
        self.meta.insert(field.into(), value);
        self
    }

    /// Parse a single JSON value without ever failing
    pub fn from_value(value: &Value) -> Self {
        let key = value
            .get("key")
            .and_then(Value::as_str)
            .map(str::to_string);
        let meta = value
            .get("meta")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        Self { key, meta }
    }

    /// Read a string metadata field
    pub fn meta_str(&self, field: &str) -> Option<&str> {
        self.meta.get(field).and_then(Value::as_str)
    }
}

/// Catalog action definition (immutable once the model is built)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionDefinition {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    pub scene: String,
    /// Authoritative duration in minutes; input events can never override it
    pub duration_min: f64,
    pub tags: Vec<String>,
    #[serde(rename = "break")]
    pub is_break: bool,
    pub fixed_deltas: TraitVector,
}

impl ActionDefinition {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// An event matched to its catalog definition and placed on the timeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedStep {
    pub def: Arc<ActionDefinition>,
    /// Duration in minutes, always taken from the catalog
    pub dur: f64,
    /// Start offset in minutes: sum of all previously resolved durations
    pub start: f64,
    /// Step-local metadata; steps are created with an empty map
    #[serde(skip)]
    pub meta: Map<String, Value>,
    /// Index of the originating event in the raw input
    #[serde(skip)]
    pub source_index: usize,
}

impl ResolvedStep {
    pub fn id(&self) -> &str {
        &self.def.id
    }

    pub fn scene(&self) -> &str {
        &self.def.scene
    }
}

/// Four-letter type, one letter per axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(non_snake_case)]
pub struct TypeLetters {
    pub EI: char,
    pub SN: char,
    pub TF: char,
    pub JP: char,
}

/// Per-axis and overall classifier confidence, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[allow(non_snake_case)]
pub struct TypeConfidence {
    pub EI: f64,
    pub SN: f64,
    pub TF: f64,
    pub JP: f64,
    pub overall: f64,
}

/// Classifier output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeResult {
    #[serde(rename = "type")]
    pub type_code: String,
    pub letters: TypeLetters,
    pub confidence: TypeConfidence,
}

/// Full scoring output of one invocation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileResult {
    #[serde(rename = "modelVersion")]
    pub model_version: String,
    /// Unbounded accumulator after all context rules
    pub raw: TraitVector,
    /// Squashed scores, each strictly inside (0, 100)
    pub scaled: TraitVector,
    pub resolved: Vec<ResolvedStep>,
    pub mbti: TypeResult,
}

/// Coarse confidence label for downstream narrative prompts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceBand {
    Low,
    Medium,
    High,
}

impl ConfidenceBand {
    pub fn from_overall(overall: f64) -> Self {
        if overall >= 0.6 {
            ConfidenceBand::High
        } else if overall <= 0.25 {
            ConfidenceBand::Low
        } else {
            ConfidenceBand::Medium
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConfidenceBand::Low => "low",
            ConfidenceBand::Medium => "medium",
            ConfidenceBand::High => "high",
        }
    }
}

/// Rounded, presentation-friendly view of a profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSummary {
    #[serde(rename = "type")]
    pub type_code: String,
    pub confidence_band: ConfidenceBand,
    /// Scaled scores rounded to whole points
    pub scores: TraitVector,
}

/// Producer metadata attached to encoded reports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Envelope around a profile for transport to collaborators
#[derive(Debug, Clone, Serialize)]
pub struct ProfileReport {
    pub report_version: String,
    pub producer: ReportProducer,
    pub computed_at_utc: String,
    pub summary: ProfileSummary,
    pub profile: ProfileResult,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_trait_vector_missing_fields_default_to_zero() {
        let v: TraitVector = serde_json::from_value(json!({ "O": 0.5, "N": -1.0 })).unwrap();
        assert_eq!(
            v,
            TraitVector {
                o: 0.5,
                n: -1.0,
                ..TraitVector::ZERO
            }
        );
    }

    #[test]
    fn test_trait_vector_index_and_arithmetic() {
        let mut v = TraitVector::ZERO;
        v[Trait::Extraversion] = 2.0;
        let w = v.plus_scaled(&TraitVector::splat(1.0), 0.5);

        assert_eq!(w.e, 2.5);
        assert_eq!(w.o, 0.5);
        assert_eq!(w.iter().count(), 5);
    }

    #[test]
    fn test_event_from_value_is_lenient() {
        let ok = Event::from_value(&json!({ "key": "wake_up", "meta": { "gameDecision": "stop" } }));
        assert_eq!(ok.key.as_deref(), Some("wake_up"));
        assert_eq!(ok.meta_str("gameDecision"), Some("stop"));

        let numeric_key = Event::from_value(&json!({ "key": 42 }));
        assert_eq!(numeric_key.key, None);

        let bad_meta = Event::from_value(&json!({ "key": "x", "meta": "oops" }));
        assert!(bad_meta.meta.is_empty());

        let not_object = Event::from_value(&json!("wake_up"));
        assert_eq!(not_object.key, None);
    }

    #[test]
    fn test_confidence_band_thresholds() {
        assert_eq!(ConfidenceBand::from_overall(0.6), ConfidenceBand::High);
        assert_eq!(ConfidenceBand::from_overall(0.25), ConfidenceBand::Low);
        assert_eq!(ConfidenceBand::from_overall(0.4), ConfidenceBand::Medium);
    }

    #[test]
    fn test_type_result_wire_names() {
        let result = TypeResult {
            type_code: "ENTJ".to_string(),
            letters: TypeLetters {
                EI: 'E',
                SN: 'N',
                TF: 'T',
                JP: 'J',
            },
            confidence: TypeConfidence {
                EI: 1.0,
                SN: 0.5,
                TF: 0.0,
                JP: 0.25,
                overall: 0.4375,
            },
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["type"], "ENTJ");
        assert_eq!(value["letters"]["EI"], "E");
        assert_eq!(value["confidence"]["overall"], 0.4375);
    }
}
