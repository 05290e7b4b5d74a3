//! Input normalizer: merges symptom text and vitals into one prompt.
//!
//! Line order is fixed (symptoms, heart rate, blood pressure, temperature)
//! and a vital's line is emitted only when its value is non-empty.  Values
//! are copied verbatim; range checking belongs to the rule-based engine.

use std::fmt;

use crate::assessment::request::ClinicalRequest;

/// The structured text block sent to the model backend.
///
/// # Example
/// ```rust
/// use symptom_insight::assessment::normalize;
///
/// let prompt = normalize("cough", "90", "", "37", false);
/// assert_eq!(
///     prompt.as_str(),
///     "Patient symptoms: cough\nHeart rate: 90 bpm\nBody temperature: 37 °C\n"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    text: String,
    has_image: bool,
}

impl Prompt {
    /// Build the prompt for an already-constructed request.
    pub fn from_request(request: &ClinicalRequest) -> Self {
        normalize(
            request.symptoms(),
            request.heart_rate(),
            request.blood_pressure(),
            request.temperature(),
            request.has_image(),
        )
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Individual prompt lines, without terminators.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.lines()
    }

    /// Whether the prompt accompanies an image (multimodal request).
    pub fn has_image(&self) -> bool {
        self.has_image
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Assemble the prompt from raw field values.
pub fn normalize(
    symptoms: &str,
    heart_rate: &str,
    blood_pressure: &str,
    temperature: &str,
    has_image: bool,
) -> Prompt {
    let mut text = String::with_capacity(128 + symptoms.len());
    text.push_str(&format!("Patient symptoms: {symptoms}\n"));
    if !heart_rate.is_empty() {
        text.push_str(&format!("Heart rate: {heart_rate} bpm\n"));
    }
    if !blood_pressure.is_empty() {
        text.push_str(&format!("Blood pressure: {blood_pressure} mmHg\n"));
    }
    if !temperature.is_empty() {
        text.push_str(&format!("Body temperature: {temperature} °C\n"));
    }
    Prompt { text, has_image }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_absent_blood_pressure() {
        let prompt = normalize("cough", "90", "", "37", false);
        let lines: Vec<&str> = prompt.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Patient symptoms: cough",
                "Heart rate: 90 bpm",
                "Body temperature: 37 °C",
            ]
        );
    }

    #[test]
    fn all_fields_in_fixed_order() {
        let prompt = normalize("headache", "72", "120/80", "36.6", true);
        assert_eq!(
            prompt.as_str(),
            "Patient symptoms: headache\n\
             Heart rate: 72 bpm\n\
             Blood pressure: 120/80 mmHg\n\
             Body temperature: 36.6 °C\n"
        );
        assert!(prompt.has_image());
    }

    #[test]
    fn symptoms_line_always_present() {
        let prompt = normalize("", "", "", "", false);
        assert_eq!(prompt.as_str(), "Patient symptoms: \n");
        assert_eq!(prompt.lines().count(), 1);
    }

    #[test]
    fn malformed_values_pass_through() {
        let prompt = normalize("dizziness", "fast", "high", "warm", false);
        assert!(prompt.as_str().contains("Heart rate: fast bpm\n"));
        assert!(prompt.as_str().contains("Blood pressure: high mmHg\n"));
        assert!(prompt.as_str().contains("Body temperature: warm °C\n"));
    }

    #[test]
    fn normalizing_twice_is_identical() {
        let a = normalize("fatigue", "58", "110/70", "37.9", false);
        let b = normalize("fatigue", "58", "110/70", "37.9", false);
        assert_eq!(a, b);
    }

    #[test]
    fn from_request_matches_normalize() {
        let req = ClinicalRequest::new("nausea", "", "130/85", "", None);
        assert_eq!(
            Prompt::from_request(&req),
            normalize("nausea", "", "130/85", "", false)
        );
    }
}
