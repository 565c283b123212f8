//! Score normalization
//!
//! Squashes the unbounded raw accumulator onto the 0-100 scale with
//! `50 + 50 * tanh(raw)`: monotonic, centered on 50, never reaching either end.

use crate::types::TraitVector;

/// Lowest representable scaled score
const SCALED_MIN: f64 = 0.0;
/// Highest representable scaled score
const SCALED_MAX: f64 = 100.0;
/// Neutral score
const SCALED_MIDPOINT: f64 = 50.0;

/// Normalizer for raw trait scores
pub struct TraitNormalizer;

impl TraitNormalizer {
    /// Map each raw trait score into (0, 100)
    pub fn normalize(raw: &TraitVector) -> TraitVector {
        raw.map(squash)
    }
}

/// `tanh` saturates to exactly ±1 in f64 for |raw| beyond ~19, which would put
/// the score on the boundary; step back to the nearest representable value
/// inside the open interval. A NaN raw score (opposing overflows) carries no
/// direction and maps to the midpoint.
fn squash(raw: f64) -> f64 {
    let scaled = 50.0 + 50.0 * raw.tanh();
    if scaled.is_nan() {
        SCALED_MIDPOINT
    } else if scaled <= SCALED_MIN {
        f64::MIN_POSITIVE
    } else if scaled >= SCALED_MAX {
        SCALED_MAX - SCALED_MAX * f64::EPSILON
    } else {
        scaled
    }
}
