//! Rule-based fallback engine — keyword/threshold narrative generator.
//!
//! Used for the whole process lifetime when no generative model is
//! available.  The narrative is an ordered list of text segments:
//!
//! ```text
//! header
//! keyword explanations   (every match, table order; or "further evaluation")
//! heart-rate sentence    (only if the reading parses)
//! temperature sentence   (only if the reading parses)
//! blood-pressure note    (only if non-empty; never evaluated)
//! image note             (only if an image was supplied)
//! conditions header + one condition list (first matching rule wins)
//! disclaimer
//! ```
//!
//! Every builder below is pure, so [`generate_demo_diagnosis`] returns
//! byte-identical output for identical input.

use std::borrow::Cow;

use crate::assessment::request::ClinicalRequest;
use crate::assessment::vitals::{
    classify_heart_rate, classify_temperature, HeartRateBand, TemperatureBand,
};

/// One piece of the narrative, in output order.
pub type Segment = Cow<'static, str>;

// ---------------------------------------------------------------------------
// Fixed texts
// ---------------------------------------------------------------------------

pub const HEADER: &str = "Based on the information provided, here's my assessment:\n\n";

pub const NO_MATCH: &str =
    "Your symptoms require further evaluation to determine a specific cause. ";

/// Keyword → explanation, matched case-insensitively as substrings.
/// Iteration order is output order.
pub const KEYWORD_EXPLANATIONS: &[(&str, &str)] = &[
    (
        "headache",
        "Your headache symptoms could be related to tension headaches, migraines, or sinus issues. ",
    ),
    (
        "fever",
        "The presence of fever suggests your body is fighting an infection. ",
    ),
    (
        "cough",
        "Your cough could be due to a respiratory infection, allergies, or irritation. ",
    ),
    (
        "rash",
        "The skin rash might indicate an allergic reaction, infection, or autoimmune condition. ",
    ),
    (
        "fatigue",
        "Fatigue can be caused by various factors including stress, poor sleep, anemia, or viral infections. ",
    ),
    (
        "pain",
        "The pain you're experiencing could be related to inflammation, injury, or underlying medical conditions. ",
    ),
    (
        "nausea",
        "Nausea can be caused by digestive issues, infections, or medication side effects. ",
    ),
    (
        "dizziness",
        "Dizziness might be related to inner ear problems, low blood pressure, or dehydration. ",
    ),
];

pub const HEART_RATE_ELEVATED: &str =
    "Your heart rate is elevated, which could indicate stress, anxiety, or infection. ";
pub const HEART_RATE_LOW: &str =
    "Your heart rate is lower than average, which could be normal for athletes or indicate certain conditions. ";
pub const HEART_RATE_NORMAL: &str = "Your heart rate is within normal range. ";

pub const TEMPERATURE_FEVER: &str =
    "You have a fever, which is often a sign that your body is fighting an infection. ";
pub const TEMPERATURE_SLIGHT: &str =
    "You have a slight elevation in temperature, which could be the beginning of a fever. ";
pub const TEMPERATURE_NORMAL: &str = "Your body temperature is within normal range. ";

pub const BLOOD_PRESSURE_NOTED: &str =
    "Your blood pressure reading has been noted in the assessment. ";

pub const IMAGE_ANALYZED: &str =
    "The image you provided has been analyzed as part of this assessment. ";

pub const CONDITIONS_HEADER: &str =
    "\n\nPossible conditions to consider based on your symptoms include:\n";

pub const DISCLAIMER: &str = "\n\nIMPORTANT: This is a simulated AI assessment for demonstration purposes only. \
It is not a medical diagnosis. Please consult with a qualified healthcare professional \
for proper evaluation, diagnosis, and treatment of your condition.";

// ---------------------------------------------------------------------------
// ConditionSet
// ---------------------------------------------------------------------------

/// The single list of possible conditions appended to every narrative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionSet {
    /// Headache together with fever.
    InfluenzaLike,
    /// Cough together with fever.
    Respiratory,
    /// Any mention of a rash.
    Dermatological,
    General,
}

impl ConditionSet {
    /// Pick the list for `symptoms`; rules are tried in priority order.
    pub fn select(symptoms: &str) -> Self {
        let lower = symptoms.to_lowercase();
        let has = |word: &str| lower.contains(word);

        if has("headache") && has("fever") {
            Self::InfluenzaLike
        } else if has("cough") && has("fever") {
            Self::Respiratory
        } else if has("rash") {
            Self::Dermatological
        } else {
            Self::General
        }
    }

    pub fn conditions(self) -> &'static [&'static str] {
        match self {
            Self::InfluenzaLike => &[
                "Viral infection (such as influenza)",
                "COVID-19",
                "Sinusitis",
            ],
            Self::Respiratory => &["Bronchitis", "Pneumonia", "COVID-19", "Common cold"],
            Self::Dermatological => &[
                "Allergic reaction",
                "Eczema",
                "Contact dermatitis",
                "Viral exanthem",
            ],
            Self::General => &[
                "Common cold",
                "Seasonal allergies",
                "Stress-related condition",
                "Viral infection",
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// Segment builders
// ---------------------------------------------------------------------------

/// Explanations for every keyword found in `symptoms`, or the generic
/// further-evaluation sentence when nothing matches.
pub fn keyword_segments(symptoms: &str) -> Vec<Segment> {
    let lower = symptoms.to_lowercase();
    let matched: Vec<Segment> = KEYWORD_EXPLANATIONS
        .iter()
        .filter(|(keyword, _)| lower.contains(keyword))
        .map(|(_, explanation)| Cow::Borrowed(*explanation))
        .collect();

    if matched.is_empty() {
        vec![Cow::Borrowed(NO_MATCH)]
    } else {
        matched
    }
}

pub fn heart_rate_segment(heart_rate: &str) -> Option<Segment> {
    let sentence = match classify_heart_rate(heart_rate)? {
        HeartRateBand::Elevated => HEART_RATE_ELEVATED,
        HeartRateBand::Low => HEART_RATE_LOW,
        HeartRateBand::Normal => HEART_RATE_NORMAL,
    };
    Some(Cow::Borrowed(sentence))
}

pub fn temperature_segment(temperature: &str) -> Option<Segment> {
    let sentence = match classify_temperature(temperature)? {
        TemperatureBand::Fever => TEMPERATURE_FEVER,
        TemperatureBand::SlightElevation => TEMPERATURE_SLIGHT,
        TemperatureBand::Normal => TEMPERATURE_NORMAL,
    };
    Some(Cow::Borrowed(sentence))
}

/// The reading is acknowledged, never evaluated.
pub fn blood_pressure_segment(blood_pressure: &str) -> Option<Segment> {
    (!blood_pressure.is_empty()).then_some(Cow::Borrowed(BLOOD_PRESSURE_NOTED))
}

pub fn image_segment(has_image: bool) -> Option<Segment> {
    has_image.then_some(Cow::Borrowed(IMAGE_ANALYZED))
}

/// Conditions header followed by one bullet line per condition.
pub fn condition_segments(symptoms: &str) -> Vec<Segment> {
    let set = ConditionSet::select(symptoms);
    std::iter::once(Cow::Borrowed(CONDITIONS_HEADER))
        .chain(
            set.conditions()
                .iter()
                .map(|name| Cow::Owned(format!("- {name}\n"))),
        )
        .collect()
}

/// All segments of the narrative, in output order.
pub fn segments(
    symptoms: &str,
    heart_rate: &str,
    blood_pressure: &str,
    temperature: &str,
    has_image: bool,
) -> Vec<Segment> {
    let mut out: Vec<Segment> = vec![Cow::Borrowed(HEADER)];
    out.extend(keyword_segments(symptoms));
    out.extend(heart_rate_segment(heart_rate));
    out.extend(temperature_segment(temperature));
    out.extend(blood_pressure_segment(blood_pressure));
    out.extend(image_segment(has_image));
    out.extend(condition_segments(symptoms));
    out.push(Cow::Borrowed(DISCLAIMER));
    out
}

/// Fold segments into the final narrative.
pub fn assemble(segments: &[Segment]) -> String {
    let len = segments.iter().map(|s| s.len()).sum();
    segments.iter().fold(String::with_capacity(len), |mut acc, s| {
        acc.push_str(s);
        acc
    })
}

/// Deterministic narrative for the rule-based path.
pub fn generate_demo_diagnosis(
    symptoms: &str,
    heart_rate: &str,
    blood_pressure: &str,
    temperature: &str,
    has_image: bool,
) -> String {
    let parts = segments(symptoms, heart_rate, blood_pressure, temperature, has_image);
    log::debug!("fallback: assembled {} narrative segments", parts.len());
    assemble(&parts)
}

// ---------------------------------------------------------------------------
// RuleBasedEngine
// ---------------------------------------------------------------------------

/// Request-level entry point to the fallback engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedEngine;

impl RuleBasedEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn assess(&self, request: &ClinicalRequest) -> String {
        generate_demo_diagnosis(
            request.symptoms(),
            request.heart_rate(),
            request.blood_pressure(),
            request.temperature(),
            request.has_image(),
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn diagnose(symptoms: &str) -> String {
        generate_demo_diagnosis(symptoms, "", "", "", false)
    }

    fn conditions_block(set: ConditionSet) -> String {
        let mut block = CONDITIONS_HEADER.to_string();
        for name in set.conditions() {
            block.push_str(&format!("- {name}\n"));
        }
        block
    }

    // -----------------------------------------------------------------------
    // Whole-narrative properties
    // -----------------------------------------------------------------------

    #[test]
    fn output_is_deterministic() {
        let a = generate_demo_diagnosis("cough and fever", "105", "140/90", "38.2", true);
        let b = generate_demo_diagnosis("cough and fever", "105", "140/90", "38.2", true);
        assert_eq!(a, b);
    }

    #[test]
    fn always_has_header_and_disclaimer() {
        for input in ["", "I feel strange", "RASH on arm", "pain pain pain"] {
            let text = diagnose(input);
            assert!(text.starts_with(HEADER), "missing header for {input:?}");
            assert!(text.ends_with(DISCLAIMER), "missing disclaimer for {input:?}");
        }
    }

    #[test]
    fn empty_input_produces_complete_narrative() {
        let expected = [
            HEADER.to_string(),
            NO_MATCH.to_string(),
            conditions_block(ConditionSet::General),
            DISCLAIMER.to_string(),
        ]
        .concat();
        assert_eq!(diagnose(""), expected);
    }

    #[test]
    fn headache_and_fever() {
        let text = diagnose("I have a headache and fever");
        assert!(text.contains(KEYWORD_EXPLANATIONS[0].1));
        assert!(text.contains(KEYWORD_EXPLANATIONS[1].1));
        assert!(!text.contains(NO_MATCH));
        assert!(text.contains(&conditions_block(ConditionSet::InfluenzaLike)));
        assert!(!text.contains("Bronchitis"));
    }

    #[test]
    fn no_keyword_uses_generic_sentence_and_default_list() {
        let text = diagnose("I feel strange");
        assert!(text.contains(NO_MATCH));
        assert!(text.contains(&conditions_block(ConditionSet::General)));
    }

    #[test]
    fn full_narrative_order() {
        let text = generate_demo_diagnosis("Rash and nausea", "55", "120/80", "37.8", true);
        let expected = [
            HEADER,
            KEYWORD_EXPLANATIONS[3].1,
            KEYWORD_EXPLANATIONS[6].1,
            HEART_RATE_LOW,
            TEMPERATURE_SLIGHT,
            BLOOD_PRESSURE_NOTED,
            IMAGE_ANALYZED,
        ]
        .concat()
            + &conditions_block(ConditionSet::Dermatological)
            + DISCLAIMER;
        assert_eq!(text, expected);
    }

    // -----------------------------------------------------------------------
    // Keyword pass
    // -----------------------------------------------------------------------

    #[test]
    fn keywords_follow_table_order_not_input_order() {
        let segs = keyword_segments("dizziness after a headache");
        assert_eq!(
            segs,
            vec![
                Cow::Borrowed(KEYWORD_EXPLANATIONS[0].1),
                Cow::Borrowed(KEYWORD_EXPLANATIONS[7].1),
            ]
        );
    }

    #[test]
    fn keyword_match_is_case_insensitive_substring() {
        let segs = keyword_segments("PAINFUL COUGHING");
        assert_eq!(segs.len(), 2);
        assert_eq!(segs[0], KEYWORD_EXPLANATIONS[2].1);
        assert_eq!(segs[1], KEYWORD_EXPLANATIONS[5].1);
    }

    #[test]
    fn every_keyword_appends_once() {
        let all = "headache fever cough rash fatigue pain nausea dizziness";
        let segs = keyword_segments(all);
        assert_eq!(segs.len(), KEYWORD_EXPLANATIONS.len());
    }

    // -----------------------------------------------------------------------
    // Vitals
    // -----------------------------------------------------------------------

    #[test]
    fn heart_rate_sentences() {
        assert_eq!(heart_rate_segment("110").as_deref(), Some(HEART_RATE_ELEVATED));
        assert_eq!(heart_rate_segment("50").as_deref(), Some(HEART_RATE_LOW));
        assert_eq!(heart_rate_segment("75").as_deref(), Some(HEART_RATE_NORMAL));
        assert_eq!(heart_rate_segment("abc"), None);
        assert_eq!(heart_rate_segment(""), None);
    }

    #[test]
    fn unparsable_heart_rate_adds_nothing() {
        let text = generate_demo_diagnosis("cough", "abc", "", "", false);
        assert!(!text.contains("heart rate"));
        assert_eq!(text, diagnose("cough"));
    }

    #[test]
    fn temperature_sentences() {
        assert_eq!(temperature_segment("38.5").as_deref(), Some(TEMPERATURE_FEVER));
        assert_eq!(temperature_segment("37.7").as_deref(), Some(TEMPERATURE_SLIGHT));
        assert_eq!(temperature_segment("36.8").as_deref(), Some(TEMPERATURE_NORMAL));
        assert_eq!(temperature_segment("warm"), None);
    }

    #[test]
    fn blood_pressure_is_only_acknowledged() {
        assert_eq!(
            blood_pressure_segment("200/120").as_deref(),
            Some(BLOOD_PRESSURE_NOTED)
        );
        assert_eq!(
            blood_pressure_segment("not a number").as_deref(),
            Some(BLOOD_PRESSURE_NOTED)
        );
        assert_eq!(blood_pressure_segment(""), None);
    }

    #[test]
    fn image_sentence_only_with_image() {
        assert_eq!(image_segment(true).as_deref(), Some(IMAGE_ANALYZED));
        assert_eq!(image_segment(false), None);
    }

    // -----------------------------------------------------------------------
    // Condition list
    // -----------------------------------------------------------------------

    #[test]
    fn condition_priority() {
        assert_eq!(ConditionSet::select("headache, fever"), ConditionSet::InfluenzaLike);
        assert_eq!(
            ConditionSet::select("headache, cough and fever"),
            ConditionSet::InfluenzaLike
        );
        assert_eq!(ConditionSet::select("Cough + FEVER"), ConditionSet::Respiratory);
        assert_eq!(ConditionSet::select("fever and rash"), ConditionSet::Dermatological);
        assert_eq!(ConditionSet::select("cough"), ConditionSet::General);
        assert_eq!(ConditionSet::select(""), ConditionSet::General);
    }

    #[test]
    fn exactly_one_condition_list() {
        let text = diagnose("rash with cough and fever");
        assert_eq!(text.matches(CONDITIONS_HEADER).count(), 1);
        assert!(text.contains(&conditions_block(ConditionSet::Respiratory)));
        assert!(!text.contains("Eczema"));
    }

    #[test]
    fn assemble_concatenates_in_order() {
        let parts: Vec<Segment> = vec![
            Cow::Borrowed("a"),
            Cow::Owned("b".into()),
            Cow::Borrowed("c"),
        ];
        assert_eq!(assemble(&parts), "abc");
        assert_eq!(assemble(&[]), "");
    }

    #[test]
    fn engine_reads_request_fields() {
        let request = ClinicalRequest::new("fatigue", "120", "", "39", None);
        let text = RuleBasedEngine::new().assess(&request);
        assert_eq!(text, generate_demo_diagnosis("fatigue", "120", "", "39", false));
        assert!(text.contains(HEART_RATE_ELEVATED));
        assert!(text.contains(TEMPERATURE_FEVER));
    }
}
