//! Model-backed path: the `ClinicalModel` trait and its HTTP backends.
//!
//! * [`OllamaModel`] calls Ollama's native `/api/generate`, passing images as
//!   base64 strings in the `images` array.
//! * [`OpenAiCompatibleModel`] calls any `/v1/chat/completions` endpoint,
//!   passing images as `image_url` data-URL content parts.
//!
//! Both bound generation with `max_tokens` and run the decoded text through
//! [`decode_output`], so an over-long answer is truncated, never an error.
//! Connection details come exclusively from [`ModelConfig`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::assessment::decode::decode_output;
use crate::assessment::prompt::Prompt;
use crate::assessment::request::PatientImage;
use crate::config::{ModelConfig, ModelProvider};
use crate::error::InferenceError;

/// Seconds allowed for the startup availability probe.
const PROBE_TIMEOUT_SECS: u64 = 5;

// ---------------------------------------------------------------------------
// ClinicalModel trait
// ---------------------------------------------------------------------------

/// A generative model that turns a prompt (and optionally an image) into an
/// assessment narrative.
///
/// Implementors must be `Send + Sync` so they can be held behind an
/// `Arc<dyn ClinicalModel>` for the lifetime of the process.
#[async_trait]
pub trait ClinicalModel: Send + Sync {
    /// Run one generation and return the decoded text.
    ///
    /// With `image` present the request is multimodal; otherwise text-only.
    /// The generated text is returned as produced, except that control
    /// tokens and surrounding whitespace are removed and the length is
    /// capped.  A generation that is empty after that clean-up is reported
    /// as [`InferenceError::EmptyResponse`] instead of an empty narrative.
    async fn infer(
        &self,
        prompt: &Prompt,
        image: Option<&PatientImage>,
    ) -> Result<String, InferenceError>;
}

fn http_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

async fn error_for_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, InferenceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(InferenceError::Http {
        status: status.as_u16(),
        body,
    })
}

// ---------------------------------------------------------------------------
// OllamaModel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
struct OllamaGenerateRequest {
    model: String,
    prompt: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    images: Vec<String>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Clone, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    #[serde(default)]
    response: String,
    #[serde(default)]
    done_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OllamaTags {
    #[serde(default)]
    models: Vec<OllamaTag>,
}

#[derive(Debug, Deserialize)]
struct OllamaTag {
    name: String,
}

/// Ollama `/api/generate` backend.
pub struct OllamaModel {
    client: reqwest::Client,
    config: ModelConfig,
}

impl OllamaModel {
    pub fn from_config(config: &ModelConfig) -> Self {
        Self {
            client: http_client(config.timeout_secs),
            config: config.clone(),
        }
    }

    fn request_body(
        &self,
        prompt: &Prompt,
        image: Option<&PatientImage>,
    ) -> OllamaGenerateRequest {
        OllamaGenerateRequest {
            model: self.config.model.clone(),
            prompt: prompt.as_str().to_string(),
            images: image.map(|img| vec![img.to_base64()]).unwrap_or_default(),
            stream: false,
            options: OllamaOptions {
                temperature: self.config.temperature,
                num_predict: self.config.max_tokens,
            },
        }
    }

    /// `true` when Ollama answers and lists the configured model.
    pub async fn probe(&self) -> bool {
        let url = endpoint(&self.config.base_url, "/api/tags");
        let response = match self
            .client
            .get(&url)
            .timeout(Duration::from_secs(PROBE_TIMEOUT_SECS))
            .send()
            .await
        {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                log::warn!("model probe: {url} answered HTTP {}", r.status());
                return false;
            }
            Err(e) => {
                log::warn!("model probe: cannot reach {url}: {e}");
                return false;
            }
        };

        match response.json::<OllamaTags>().await {
            Ok(tags) => {
                let found = tags.models.iter().any(|t| tag_matches(&t.name, &self.config.model));
                if !found {
                    log::warn!("model probe: '{}' is not pulled on Ollama", self.config.model);
                }
                found
            }
            Err(e) => {
                log::warn!("model probe: unreadable tag list: {e}");
                false
            }
        }
    }
}

/// Ollama lists models as `name:tag`; a bare configured name matches any tag.
fn tag_matches(listed: &str, configured: &str) -> bool {
    listed == configured
        || listed
            .strip_prefix(configured)
            .is_some_and(|rest| rest.starts_with(':'))
}

#[async_trait]
impl ClinicalModel for OllamaModel {
    async fn infer(
        &self,
        prompt: &Prompt,
        image: Option<&PatientImage>,
    ) -> Result<String, InferenceError> {
        let url = endpoint(&self.config.base_url, "/api/generate");
        let body = self.request_body(prompt, image);

        log::debug!(
            "ollama: generating with '{}' (multimodal={})",
            self.config.model,
            image.is_some()
        );

        let response = self.client.post(&url).json(&body).send().await?;
        let response = error_for_status(response).await?;

        let parsed: OllamaGenerateResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::Parse(e.to_string()))?;

        if parsed.done_reason.as_deref() == Some("length") {
            log::debug!("ollama: generation stopped at the token budget");
        }

        let text = decode_output(&parsed.response, self.config.max_output_chars);
        if text.is_empty() {
            return Err(InferenceError::EmptyResponse);
        }
        Ok(text)
    }
}

// ---------------------------------------------------------------------------
// OpenAiCompatibleModel
// ---------------------------------------------------------------------------

/// Calls an OpenAI-compatible `/v1/chat/completions` endpoint.
///
/// The `Authorization: Bearer …` header is attached only when
/// `config.api_key` is a non-empty string.
pub struct OpenAiCompatibleModel {
    client: reqwest::Client,
    config: ModelConfig,
}

impl OpenAiCompatibleModel {
    pub fn from_config(config: &ModelConfig) -> Self {
        Self {
            client: http_client(config.timeout_secs),
            config: config.clone(),
        }
    }

    fn api_key(&self) -> Option<&str> {
        self.config.api_key.as_deref().filter(|k| !k.is_empty())
    }

    fn request_body(&self, prompt: &Prompt, image: Option<&PatientImage>) -> serde_json::Value {
        let content = match image {
            Some(img) => serde_json::json!([
                { "type": "text",      "text": prompt.as_str() },
                { "type": "image_url", "image_url": { "url": img.to_data_url() } }
            ]),
            None => serde_json::Value::String(prompt.as_str().to_string()),
        };

        serde_json::json!({
            "model":       self.config.model,
            "messages":    [ { "role": "user", "content": content } ],
            "stream":      false,
            "temperature": self.config.temperature,
            "max_tokens":  self.config.max_tokens
        })
    }

    /// `true` when `/v1/models` answers with a success status.
    pub async fn probe(&self) -> bool {
        let url = endpoint(&self.config.base_url, "/v1/models");
        let mut req = self
            .client
            .get(&url)
            .timeout(Duration::from_secs(PROBE_TIMEOUT_SECS));
        if let Some(key) = self.api_key() {
            req = req.bearer_auth(key);
        }
        match req.send().await {
            Ok(r) if r.status().is_success() => true,
            Ok(r) => {
                log::warn!("model probe: {url} answered HTTP {}", r.status());
                false
            }
            Err(e) => {
                log::warn!("model probe: cannot reach {url}: {e}");
                false
            }
        }
    }
}

/// Pull the first choice's text out of a chat-completions response.
fn first_choice_content(json: &serde_json::Value) -> Option<&str> {
    json["choices"][0]["message"]["content"].as_str()
}

#[async_trait]
impl ClinicalModel for OpenAiCompatibleModel {
    async fn infer(
        &self,
        prompt: &Prompt,
        image: Option<&PatientImage>,
    ) -> Result<String, InferenceError> {
        let url = endpoint(&self.config.base_url, "/v1/chat/completions");
        let body = self.request_body(prompt, image);

        let mut req = self.client.post(&url).json(&body);
        if let Some(key) = self.api_key() {
            req = req.bearer_auth(key);
        }

        let response = error_for_status(req.send().await?).await?;
        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| InferenceError::Parse(e.to_string()))?;

        let raw = first_choice_content(&json).ok_or(InferenceError::EmptyResponse)?;
        let text = decode_output(raw, self.config.max_output_chars);
        if text.is_empty() {
            return Err(InferenceError::EmptyResponse);
        }
        Ok(text)
    }
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

/// Build the configured backend and, if requested, probe it once.
///
/// Returns `None` when the provider is disabled or the probe fails; the
/// caller then runs rule-based for the rest of the process.
pub async fn connect(config: &ModelConfig) -> Option<Arc<dyn ClinicalModel>> {
    match config.provider {
        ModelProvider::Disabled => None,
        ModelProvider::Ollama => {
            let model = OllamaModel::from_config(config);
            if config.probe_on_startup && !model.probe().await {
                return None;
            }
            Some(Arc::new(model))
        }
        ModelProvider::OpenAiCompatible => {
            let model = OpenAiCompatibleModel::from_config(config);
            if config.probe_on_startup && !model.probe().await {
                return None;
            }
            Some(Arc::new(model))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
