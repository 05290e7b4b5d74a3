//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// OperatingMode
// ---------------------------------------------------------------------------

/// Selects which inference path the process runs with.
///
/// | Variant     | Path                                          | Requires model |
/// |-------------|-----------------------------------------------|----------------|
/// | ModelBacked | Prompt → generative model (probed at startup) | Yes            |
/// | RuleBased   | Symptoms + vitals → keyword/threshold engine  | No             |
///
/// `ModelBacked` is a preference: if the model cannot be reached at startup
/// the process runs rule-based for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OperatingMode {
    ModelBacked,
    RuleBased,
}

impl Default for OperatingMode {
    fn default() -> Self {
        Self::ModelBacked
    }
}

// ---------------------------------------------------------------------------
// ModelProvider
// ---------------------------------------------------------------------------

/// Selects which backend serves the generative model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ModelProvider {
    /// Ollama running locally, `/api/generate` with base64 images.
    Ollama,
    /// Any OpenAI-compatible REST API (vLLM, LM Studio, OpenAI …).
    OpenAiCompatible,
    /// No model — forces the rule-based engine.
    Disabled,
}

impl Default for ModelProvider {
    fn default() -> Self {
        Self::Ollama
    }
}

// ---------------------------------------------------------------------------
// ModelConfig
// ---------------------------------------------------------------------------

/// Settings for the model-backed inference path.
///
/// Missing keys take their [`Default`] value, so a settings file may list
/// only the fields it overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Whether the model path may be used at all.
    pub enabled: bool,
    /// Which backend to use.
    pub provider: ModelProvider,
    /// Base URL of the API endpoint.
    ///
    /// - Ollama default: `http://localhost:11434`
    /// - vLLM / OpenAI-compatible: e.g. `http://localhost:8000`
    pub base_url: String,
    /// API key — `None` for local providers.
    pub api_key: Option<String>,
    /// Model identifier sent to the API.
    pub model: String,
    /// Sampling temperature (0.0 – 1.0).
    pub temperature: f32,
    /// Maximum seconds to wait for a generation before timing out.
    pub timeout_secs: u64,
    /// Generation budget in tokens; longer outputs are truncated.
    pub max_tokens: u32,
    /// Hard cap on the decoded narrative, in characters.
    pub max_output_chars: usize,
    /// Check that the model is reachable before committing to it.
    pub probe_on_startup: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            provider: ModelProvider::default(),
            base_url: "http://localhost:11434".into(),
            api_key: None,
            model: "Bio-Medical-MultiModal-Llama-3-8B-V1".into(),
            temperature: 0.2,
            timeout_secs: 120,
            max_tokens: 500,
            max_output_chars: 4_000,
            probe_on_startup: true,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use symptom_insight::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Preferred inference path.
    pub operating_mode: OperatingMode,
    /// Model backend settings.
    pub model: ModelConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// `true` when the configuration asks for the model-backed path.
    ///
    /// Whether the model is actually used is decided once at startup by the
    /// dispatcher, which may still fall back if the probe fails.
    pub fn model_requested(&self) -> bool {
        self.operating_mode == OperatingMode::ModelBacked
            && self.model.enabled
            && self.model.provider != ModelProvider::Disabled
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
