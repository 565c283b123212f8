//! Profile report encoder
//!
//! Wraps a scored profile in a transport envelope with producer metadata and a
//! rounded summary for downstream collaborators (narrative generation, UI).

use crate::error::ComputeError;
use crate::types::{
    ConfidenceBand, ProfileReport, ProfileResult, ProfileSummary, ReportProducer,
};
use crate::{PERSONA_VERSION, PRODUCER_NAME};
use chrono::Utc;
use uuid::Uuid;

/// Current report envelope version
pub const REPORT_VERSION: &str = "1.0.0";

/// Profile report encoder
pub struct ProfileEncoder {
    instance_id: String,
}

impl Default for ProfileEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    /// Encode a profile into a report
    pub fn encode(&self, profile: &ProfileResult) -> ProfileReport {
        ProfileReport {
            report_version: REPORT_VERSION.to_string(),
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: PERSONA_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            computed_at_utc: Utc::now().to_rfc3339(),
            summary: summarize(profile),
            profile: profile.clone(),
        }
    }

    /// Encode to pretty JSON
    pub fn encode_to_json(&self, profile: &ProfileResult) -> Result<String, ComputeError> {
        serde_json::to_string_pretty(&self.encode(profile))
            .map_err(|e| ComputeError::EncodingError(e.to_string()))
    }
}

/// Rounded scores plus a confidence band
pub fn summarize(profile: &ProfileResult) -> ProfileSummary {
    ProfileSummary {
        type_code: profile.mbti.type_code.clone(),
        confidence_band: ConfidenceBand::from_overall(profile.mbti.confidence.overall),
        scores: profile.scaled.map(f64::round),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::TypeClassifier;
    use crate::types::TraitVector;
    use pretty_assertions::assert_eq;

    fn profile() -> ProfileResult {
        let scaled = TraitVector {
            o: 88.08,
            c: 31.4,
            e: 50.5,
            a: 72.9,
            n: 49.49,
        };
        ProfileResult {
            model_version: "1.0.0".to_string(),
            raw: TraitVector::ZERO,
            scaled,
            resolved: vec![],
            mbti: TypeClassifier::classify(&scaled),
        }
    }

    #[test]
    fn test_summary_rounds_scores() {
        let summary = summarize(&profile());
        assert_eq!(
            summary.scores,
            TraitVector {
                o: 88.0,
                c: 31.0,
                e: 51.0,
                a: 73.0,
                n: 49.0,
            }
        );
        assert_eq!(summary.type_code, profile().mbti.type_code);
    }

    #[test]
    fn test_report_envelope() {
        let encoder = ProfileEncoder::with_instance_id("instance-1".to_string());
        let json = encoder.encode_to_json(&profile()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["report_version"], REPORT_VERSION);
        assert_eq!(value["producer"]["name"], PRODUCER_NAME);
        assert_eq!(value["producer"]["instance_id"], "instance-1");
        assert!(value["computed_at_utc"].is_string());
        assert_eq!(value["profile"]["modelVersion"], "1.0.0");
        assert!(value["summary"]["confidence_band"].is_string());
    }

    #[test]
    fn test_unique_instance_ids() {
        assert_ne!(ProfileEncoder::new().instance_id, ProfileEncoder::new().instance_id);
    }
}
