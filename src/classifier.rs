//! Four-letter type classification
//!
//! Each axis is decided from one Big Five score with a dual threshold. Scores
//! in the 45-55 band fall back to a tie-break on a second trait.

use crate::types::{TraitVector, TypeConfidence, TypeLetters, TypeResult};

/// Upper edge of the undecided band
const MID_HI: f64 = 55.0;
/// Lower edge of the undecided band
const MID_LO: f64 = 45.0;
/// Neutral score
const MIDPOINT: f64 = 50.0;
/// Distance from the midpoint that yields full confidence
const FULL_CONFIDENCE_DISTANCE: f64 = 25.0;
/// Divisor for the Neuroticism penalty; N=100 costs 0.1 overall confidence
const NEURO_PENALTY_DIVISOR: f64 = 500.0;

/// Type classifier
pub struct TypeClassifier;

impl TypeClassifier {
    /// Classify scaled (0-100) trait scores
    pub fn classify(scaled: &TraitVector) -> TypeResult {
        let TraitVector { o, c, e, a, n } = *scaled;

        let letters = TypeLetters {
            EI: pick_ei(e, o, c),
            SN: pick_sn(o, e),
            TF: pick_tf(a, c),
            JP: pick_jp(c, o),
        };

        let ei = confidence_from_mid(e);
        let sn = confidence_from_mid(o);
        let tf = confidence_from_mid(a);
        let jp = confidence_from_mid(c);

        let average = (ei + sn + tf + jp) / 4.0;
        let neuro_penalty = ((n - MIDPOINT) / NEURO_PENALTY_DIVISOR).max(0.0);
        let overall = (average - neuro_penalty).clamp(0.0, 1.0);

        TypeResult {
            type_code: [letters.EI, letters.SN, letters.TF, letters.JP]
                .iter()
                .collect(),
            letters,
            confidence: TypeConfidence {
                EI: ei,
                SN: sn,
                TF: tf,
                JP: jp,
                overall,
            },
        }
    }
}

/// `|v - 50| / 25`, clamped to [0, 1]
fn confidence_from_mid(v: f64) -> f64 {
    ((v - MIDPOINT).abs() / FULL_CONFIDENCE_DISTANCE).clamp(0.0, 1.0)
}

/// Extraversion decides; ties lean E when exploration outweighs planning
fn pick_ei(e: f64, o: f64, c: f64) -> char {
    if e >= MID_HI {
        'E'
    } else if e <= MID_LO {
        'I'
    } else if o >= c {
        'E'
    } else {
        'I'
    }
}

/// Openness decides; ties lean N for outgoing profiles
fn pick_sn(o: f64, e: f64) -> char {
    if o >= MID_HI {
        'N'
    } else if o <= MID_LO {
        'S'
    } else if e >= MIDPOINT {
        'N'
    } else {
        'S'
    }
}

/// Agreeableness decides; ties lean T for orderly profiles
fn pick_tf(a: f64, c: f64) -> char {
    if a >= MID_HI {
        'F'
    } else if a <= MID_LO {
        'T'
    } else if c >= MIDPOINT {
        'T'
    } else {
        'F'
    }
}

/// Conscientiousness decides; ties lean P for exploratory profiles
fn pick_jp(c: f64, o: f64) -> char {
    if c >= MID_HI {
        'J'
    } else if c <= MID_LO {
        'P'
    } else if o >= MIDPOINT {
        'P'
    } else {
        'J'
    }
}
