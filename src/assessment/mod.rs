//! Assessment core: prompt normalization, dispatch, and both inference paths.
//!
//! This module provides:
//! * [`ClinicalRequest`] / [`PatientImage`] — one request's inputs.
//! * [`normalize`] / [`Prompt`] — the structured prompt for the model.
//! * [`InferenceDispatcher`] — chooses the path once, at construction.
//! * [`ClinicalModel`] — async trait implemented by model backends
//!   ([`OllamaModel`], [`OpenAiCompatibleModel`]).
//! * [`generate_demo_diagnosis`] — the deterministic rule-based narrative.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use symptom_insight::assessment::{ClinicalRequest, InferenceDispatcher};
//! use symptom_insight::config::AppConfig;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!
//!     // Probes the model once; falls back to rule-based if unreachable.
//!     let dispatcher = InferenceDispatcher::from_config(&config).await;
//!
//!     let request = ClinicalRequest::new("headache and fever", "104", "", "38.6", None);
//!     let result = dispatcher.assess(&request).await.unwrap();
//!     println!("{}", result.narrative());
//! }
//! ```

pub mod decode;
pub mod dispatcher;
pub mod fallback;
pub mod model;
pub mod prompt;
pub mod request;
pub mod vitals;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use decode::strip_control_tokens;
pub use dispatcher::{AssessmentResult, InferenceDispatcher, InferenceMode};
pub use fallback::{generate_demo_diagnosis, ConditionSet, RuleBasedEngine};
pub use model::{ClinicalModel, OllamaModel, OpenAiCompatibleModel};
pub use prompt::{normalize, Prompt};
pub use request::{ClinicalRequest, PatientImage};
pub use vitals::{HeartRateBand, TemperatureBand};
