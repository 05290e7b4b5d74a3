//! Symptom Insight — multimodal symptom assessment with a rule-based fallback.
//!
//! The crate turns a patient's symptom text, optional vitals and an optional
//! image into a natural-language assessment, either by delegating to a
//! generative model or, when none is available, by a deterministic
//! keyword/threshold engine.

pub mod assessment;
pub mod config;
pub mod error;
pub mod intake;
