//! Per-call input record: symptom text, optional vitals, optional image.

use base64::Engine as _;
use image::ImageFormat;

// ---------------------------------------------------------------------------
// PatientImage
// ---------------------------------------------------------------------------

/// An uploaded image that has already been decoded and validated by the
/// intake layer.  The original encoded bytes are kept for the model backend.
#[derive(Debug, Clone)]
pub struct PatientImage {
    bytes: Vec<u8>,
    format: ImageFormat,
    width: u32,
    height: u32,
}

impl PatientImage {
    pub fn new(bytes: Vec<u8>, format: ImageFormat, width: u32, height: u32) -> Self {
        Self {
            bytes,
            format,
            width,
            height,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// MIME type used when the image is embedded as a data URL.
    pub fn mime_type(&self) -> &'static str {
        match self.format {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Bmp => "image/bmp",
            _ => "application/octet-stream",
        }
    }

    /// Standard base64 of the encoded bytes (Ollama `images` field).
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }

    /// `data:` URL for OpenAI-style `image_url` content parts.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type(), self.to_base64())
    }
}

// ---------------------------------------------------------------------------
// ClinicalRequest
// ---------------------------------------------------------------------------

/// One assessment request.
///
/// Vitals are kept as the strings the caller supplied; an empty string means
/// the reading was not given.  Numeric interpretation happens later and only
/// in the rule-based engine.
#[derive(Debug, Clone, Default)]
pub struct ClinicalRequest {
    symptoms: String,
    heart_rate: String,
    blood_pressure: String,
    temperature: String,
    image: Option<PatientImage>,
}

impl ClinicalRequest {
    pub fn new(
        symptoms: impl Into<String>,
        heart_rate: impl Into<String>,
        blood_pressure: impl Into<String>,
        temperature: impl Into<String>,
        image: Option<PatientImage>,
    ) -> Self {
        Self {
            symptoms: symptoms.into(),
            heart_rate: heart_rate.into(),
            blood_pressure: blood_pressure.into(),
            temperature: temperature.into(),
            image,
        }
    }

    pub fn symptoms(&self) -> &str {
        &self.symptoms
    }

    pub fn heart_rate(&self) -> &str {
        &self.heart_rate
    }

    pub fn blood_pressure(&self) -> &str {
        &self.blood_pressure
    }

    pub fn temperature(&self) -> &str {
        &self.temperature
    }

    pub fn image(&self) -> Option<&PatientImage> {
        self.image.as_ref()
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }
}
