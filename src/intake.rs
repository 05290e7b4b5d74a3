//! Intake and reporting around the assessment core.
//!
//! Turns form-shaped raw fields (and an optional image file) into a
//! [`ClinicalRequest`], and wraps the outcome in the JSON envelope returned
//! to the caller.  Image bytes are decoded here so that corrupt uploads fail
//! before the core is reached.

use std::path::{Path, PathBuf};

use image::GenericImageView;
use serde::Serialize;

use crate::assessment::{AssessmentResult, ClinicalRequest, PatientImage};
use crate::error::ImageDecodeError;

// ---------------------------------------------------------------------------
// Image decoding
// ---------------------------------------------------------------------------

/// Validate and decode in-memory image bytes.
pub fn decode_image(bytes: Vec<u8>) -> Result<PatientImage, ImageDecodeError> {
    if bytes.is_empty() {
        return Err(ImageDecodeError::Empty);
    }
    let format = image::guess_format(&bytes)?;
    let decoded = image::load_from_memory_with_format(&bytes, format)?;
    let (width, height) = decoded.dimensions();
    log::debug!("intake: decoded {format:?} image {width}x{height}");
    Ok(PatientImage::new(bytes, format, width, height))
}

/// Read and decode an image file.
pub fn load_image(path: &Path) -> Result<PatientImage, ImageDecodeError> {
    let bytes = std::fs::read(path).map_err(|source| ImageDecodeError::Io {
        path: path.display().to_string(),
        source,
    })?;
    decode_image(bytes)
}

// ---------------------------------------------------------------------------
// RawSubmission
// ---------------------------------------------------------------------------

/// The fields of one submission exactly as the caller received them.
/// Missing text fields are empty strings.
#[derive(Debug, Clone, Default)]
pub struct RawSubmission {
    pub symptoms: String,
    pub heart_rate: String,
    pub blood_pressure: String,
    pub temperature: String,
    pub image_path: Option<PathBuf>,
}

impl RawSubmission {
    /// Build the request, decoding the image if one was supplied.
    pub fn into_request(self) -> Result<ClinicalRequest, ImageDecodeError> {
        let image = self.image_path.as_deref().map(load_image).transpose()?;
        Ok(ClinicalRequest::new(
            self.symptoms,
            self.heart_rate,
            self.blood_pressure,
            self.temperature,
            image,
        ))
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Echo of the submitted inputs, returned next to the diagnosis.
#[derive(Debug, Clone, Serialize)]
pub struct InputEcho {
    pub symptoms: String,
    pub heart_rate: String,
    pub blood_pressure: String,
    pub temperature: String,
    pub image_provided: bool,
    pub inference_mode: String,
}

/// Success envelope.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentReport {
    pub diagnosis: String,
    pub input_data: InputEcho,
}

impl AssessmentReport {
    pub fn new(request: &ClinicalRequest, result: AssessmentResult, inference_mode: &str) -> Self {
        Self {
            diagnosis: result.into_narrative(),
            input_data: InputEcho {
                symptoms: request.symptoms().to_string(),
                heart_rate: request.heart_rate().to_string(),
                blood_pressure: request.blood_pressure().to_string(),
                temperature: request.temperature().to_string(),
                image_provided: request.has_image(),
                inference_mode: inference_mode.to_string(),
            },
        }
    }
}

/// Failure envelope; carries only the error description.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub error: String,
}

impl ErrorReport {
    pub fn new(error: &dyn std::fmt::Display) -> Self {
        Self {
            error: error.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
