//! Configuration module for Symptom Insight.
//!
//! Provides `AppConfig` (top-level settings), the model backend sub-config,
//! `AppPaths` for the platform config directory, and TOML persistence via
//! `AppConfig::load` / `AppConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{AppConfig, ModelConfig, ModelProvider, OperatingMode};
