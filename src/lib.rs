//! Persona Flux - Deterministic personality scoring from routine-action logs
//!
//! Flux turns a time-ordered log of routine choices into Big Five trait scores
//! and a four-letter type through a deterministic pipeline: sequence
//! resolution → trait accumulation → context rules → normalization →
//! type classification.
//!
//! ## Modules
//!
//! - **Model**: Typed, validated rule configuration (action catalog + tuning)
//! - **Pipeline**: Pure scoring function and a shareable engine
//! - **Encoder**: Transport envelope for downstream collaborators

pub mod accumulator;
pub mod classifier;
pub mod config;
pub mod encoder;
pub mod error;
pub mod model;
pub mod normalizer;
pub mod pipeline;
pub mod resolver;
pub mod rules;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use encoder::ProfileEncoder;
pub use error::ComputeError;
pub use model::{Model, ModelLoader};
pub use pipeline::{calc, events_to_profile, ProfileEngine};
pub use rules::ContextRule;
pub use types::{Event, ProfileResult, Trait, TraitVector, TypeResult};

/// Library version embedded in encoded reports
pub const PERSONA_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for encoded reports
pub const PRODUCER_NAME: &str = "persona-flux";
