//! Inference dispatcher — picks the model-backed or rule-based path.
//!
//! The choice is made once, when the dispatcher is built, and never
//! re-evaluated:
//!
//! ```text
//! ClinicalRequest ─▶ Prompt::from_request ─▶ dispatch
//!                                              ├─ ModelBacked → model.infer(prompt, image)
//!                                              │     └─ Err → propagated (no fallback, no retry)
//!                                              └─ RuleBased   → generate_demo_diagnosis(fields)
//! ```

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::assessment::fallback::RuleBasedEngine;
use crate::assessment::model::{self, ClinicalModel};
use crate::assessment::prompt::Prompt;
use crate::assessment::request::ClinicalRequest;
use crate::config::AppConfig;
use crate::error::AssessmentError;

// ---------------------------------------------------------------------------
// AssessmentResult
// ---------------------------------------------------------------------------

/// The narrative produced for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssessmentResult {
    narrative: String,
}

impl AssessmentResult {
    pub fn new(narrative: String) -> Self {
        Self { narrative }
    }

    pub fn narrative(&self) -> &str {
        &self.narrative
    }

    pub fn into_narrative(self) -> String {
        self.narrative
    }
}

// ---------------------------------------------------------------------------
// InferenceMode
// ---------------------------------------------------------------------------

/// Process-wide inference capability, fixed at startup.
#[derive(Clone)]
pub enum InferenceMode {
    ModelBacked(Arc<dyn ClinicalModel>),
    RuleBased,
}

impl InferenceMode {
    pub fn label(&self) -> &'static str {
        match self {
            Self::ModelBacked(_) => "model",
            Self::RuleBased => "rule-based",
        }
    }
}

impl fmt::Debug for InferenceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// InferenceDispatcher
// ---------------------------------------------------------------------------

/// Routes every request to the path chosen at construction.
///
/// Holds no mutable state, so one dispatcher can serve concurrent requests.
#[derive(Debug, Clone)]
pub struct InferenceDispatcher {
    mode: InferenceMode,
    fallback: RuleBasedEngine,
}

impl InferenceDispatcher {
    pub fn new(mode: InferenceMode) -> Self {
        Self {
            mode,
            fallback: RuleBasedEngine::new(),
        }
    }

    pub fn rule_based() -> Self {
        Self::new(InferenceMode::RuleBased)
    }

    pub fn with_model(model: Arc<dyn ClinicalModel>) -> Self {
        Self::new(InferenceMode::ModelBacked(model))
    }

    /// Decide the inference mode from configuration, probing the model once.
    pub async fn from_config(config: &AppConfig) -> Self {
        if !config.model_requested() {
            log::info!("dispatcher: model path not requested; running rule-based");
            return Self::rule_based();
        }

        match model::connect(&config.model).await {
            Some(model) => {
                log::info!(
                    "dispatcher: using model '{}' via {:?}",
                    config.model.model,
                    config.model.provider
                );
                Self::with_model(model)
            }
            None => {
                log::warn!(
                    "dispatcher: model '{}' unavailable; running rule-based for this process",
                    config.model.model
                );
                Self::rule_based()
            }
        }
    }

    pub fn mode(&self) -> &InferenceMode {
        &self.mode
    }

    pub fn is_model_backed(&self) -> bool {
        matches!(self.mode, InferenceMode::ModelBacked(_))
    }

    /// Produce the assessment for an already-normalized prompt.
    ///
    /// A model failure is returned as-is; the fallback engine is not tried.
    pub async fn dispatch(
        &self,
        prompt: &Prompt,
        request: &ClinicalRequest,
    ) -> Result<AssessmentResult, AssessmentError> {
        let narrative = match &self.mode {
            InferenceMode::ModelBacked(model) => {
                model.infer(prompt, request.image()).await.map_err(|e| {
                    log::error!("dispatcher: model inference failed: {e}");
                    AssessmentError::from(e)
                })?
            }
            InferenceMode::RuleBased => self.fallback.assess(request),
        };
        Ok(AssessmentResult::new(narrative))
    }

    /// Normalize `request` and dispatch it.
    pub async fn assess(
        &self,
        request: &ClinicalRequest,
    ) -> Result<AssessmentResult, AssessmentError> {
        let prompt = Prompt::from_request(request);
        log::debug!("dispatcher: prompt has {} lines", prompt.lines().count());
        self.dispatch(&prompt, request).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::assessment::fallback::generate_demo_diagnosis;
    use crate::assessment::request::PatientImage;
    use crate::config::{ModelProvider, OperatingMode};
    use crate::error::InferenceError;
    use async_trait::async_trait;

    // -----------------------------------------------------------------------
    // Test doubles
    // -----------------------------------------------------------------------

    /// Records what it was asked and answers with a fixed string.
    #[derive(Default)]
    struct RecordingModel {
        seen: Mutex<Vec<(String, bool)>>,
    }

    #[async_trait]
    impl ClinicalModel for RecordingModel {
        async fn infer(
            &self,
            prompt: &Prompt,
            image: Option<&PatientImage>,
        ) -> Result<String, InferenceError> {
            self.seen
                .lock()
                .unwrap()
                .push((prompt.as_str().to_string(), image.is_some()));
            Ok("model says rest".into())
        }
    }

    struct FailingModel;

    #[async_trait]
    impl ClinicalModel for FailingModel {
        async fn infer(
            &self,
            _prompt: &Prompt,
            _image: Option<&PatientImage>,
        ) -> Result<String, InferenceError> {
            Err(InferenceError::Parse("bad json".into()))
        }
    }

    fn png() -> PatientImage {
        PatientImage::new(vec![1, 2, 3], image::ImageFormat::Png, 1, 1)
    }

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn rule_based_returns_fallback_narrative() {
        let dispatcher = InferenceDispatcher::rule_based();
        let request = ClinicalRequest::new("cough and fever", "110", "", "38.4", None);

        let result = dispatcher.assess(&request).await.unwrap();
        assert_eq!(
            result.narrative(),
            generate_demo_diagnosis("cough and fever", "110", "", "38.4", false)
        );
        assert!(!dispatcher.is_model_backed());
    }

    #[tokio::test]
    async fn model_output_is_returned_verbatim() {
        let model = Arc::new(RecordingModel::default());
        let dispatcher = InferenceDispatcher::with_model(model.clone());
        let request = ClinicalRequest::new("headache", "", "120/80", "", None);

        let result = dispatcher.assess(&request).await.unwrap();
        assert_eq!(result.narrative(), "model says rest");

        let seen = model.seen.lock().unwrap();
        assert_eq!(
            seen.as_slice(),
            &[("Patient symptoms: headache\nBlood pressure: 120/80 mmHg\n".to_string(), false)]
        );
    }

    #[tokio::test]
    async fn image_is_forwarded_to_model() {
        let model = Arc::new(RecordingModel::default());
        let dispatcher = InferenceDispatcher::with_model(model.clone());
        let request = ClinicalRequest::new("rash", "", "", "", Some(png()));

        dispatcher.assess(&request).await.unwrap();
        assert!(model.seen.lock().unwrap()[0].1);
    }

    #[tokio::test]
    async fn model_failure_propagates_without_fallback() {
        let dispatcher = InferenceDispatcher::with_model(Arc::new(FailingModel));
        let request = ClinicalRequest::new("fever", "", "", "", None);

        let err = dispatcher.assess(&request).await.unwrap_err();
        assert!(matches!(
            err,
            AssessmentError::Inference(InferenceError::Parse(_))
        ));
        assert_eq!(err.to_string(), "failed to parse model response: bad json");
    }

    #[tokio::test]
    async fn dispatch_uses_given_prompt() {
        let model = Arc::new(RecordingModel::default());
        let dispatcher = InferenceDispatcher::with_model(model.clone());
        let request = ClinicalRequest::new("nausea", "", "", "", None);
        let prompt = Prompt::from_request(&request);

        dispatcher.dispatch(&prompt, &request).await.unwrap();
        assert_eq!(model.seen.lock().unwrap()[0].0, prompt.as_str());
    }

    #[tokio::test]
    async fn from_config_rule_based_mode() {
        let mut config = AppConfig::default();
        config.operating_mode = OperatingMode::RuleBased;
        let dispatcher = InferenceDispatcher::from_config(&config).await;
        assert!(!dispatcher.is_model_backed());
        assert_eq!(dispatcher.mode().label(), "rule-based");
    }

    #[tokio::test]
    async fn from_config_unreachable_model_falls_back_once() {
        let mut config = AppConfig::default();
        config.model.provider = ModelProvider::Ollama;
        config.model.base_url = "http://127.0.0.1:1".into();
        let dispatcher = InferenceDispatcher::from_config(&config).await;
        assert!(!dispatcher.is_model_backed());
    }

    #[tokio::test]
    async fn concurrent_requests_are_independent() {
        let dispatcher = InferenceDispatcher::rule_based();
        let a = ClinicalRequest::new("rash", "", "", "", None);
        let b = ClinicalRequest::new("dizziness", "45", "", "", None);

        let (ra, rb) = tokio::join!(dispatcher.assess(&a), dispatcher.assess(&b));
        assert_eq!(ra.unwrap().narrative(), generate_demo_diagnosis("rash", "", "", "", false));
        assert_eq!(
            rb.unwrap().into_narrative(),
            generate_demo_diagnosis("dizziness", "45", "", "", false)
        );
    }
}
