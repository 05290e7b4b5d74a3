//! Parse-or-skip interpretation of heart rate and body temperature.
//!
//! A reading that does not parse as a number yields `None` and contributes
//! nothing to the narrative.  Blood pressure is never parsed.

/// Parse a free-text numeric reading, ignoring surrounding whitespace.
///
/// Digit-group underscores (`1_000`) are accepted when each one sits
/// between two digits; any other underscore makes the reading unparsable.
pub fn parse_reading(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if !trimmed.contains('_') {
        return trimmed.parse::<f64>().ok();
    }
    if !underscores_between_digits(trimmed) {
        return None;
    }
    trimmed.replace('_', "").parse::<f64>().ok()
}

fn underscores_between_digits(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.iter().enumerate().all(|(i, &b)| {
        b != b'_'
            || (i > 0
                && i + 1 < bytes.len()
                && bytes[i - 1].is_ascii_digit()
                && bytes[i + 1].is_ascii_digit())
    })
}

// ---------------------------------------------------------------------------
// Heart rate
// ---------------------------------------------------------------------------

/// Heart-rate band in beats per minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartRateBand {
    /// Above 100 bpm.
    Elevated,
    /// Below 60 bpm.
    Low,
    Normal,
}

impl HeartRateBand {
    pub fn from_bpm(bpm: f64) -> Self {
        if bpm > 100.0 {
            Self::Elevated
        } else if bpm < 60.0 {
            Self::Low
        } else {
            Self::Normal
        }
    }
}

pub fn classify_heart_rate(raw: &str) -> Option<HeartRateBand> {
    parse_reading(raw).map(HeartRateBand::from_bpm)
}

// ---------------------------------------------------------------------------
// Temperature
// ---------------------------------------------------------------------------

/// Body-temperature band in °C.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureBand {
    /// Above 38 °C.
    Fever,
    /// Above 37.5 °C, up to and including 38 °C.
    SlightElevation,
    Normal,
}

impl TemperatureBand {
    pub fn from_celsius(celsius: f64) -> Self {
        if celsius > 38.0 {
            Self::Fever
        } else if celsius > 37.5 {
            Self::SlightElevation
        } else {
            Self::Normal
        }
    }
}

pub fn classify_temperature(raw: &str) -> Option<TemperatureBand> {
    parse_reading(raw).map(TemperatureBand::from_celsius)
}
