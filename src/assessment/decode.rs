//! Clean-up of raw model output before it is returned as a narrative.

use std::sync::LazyLock;

use regex::Regex;

/// Special tokens that some backends leak into generated text
/// (`<|eot_id|>`, `<s>`, `[INST]` …).
static CONTROL_TOKENS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<\|[^|>]*\|>|</?s>|\[/?INST\]|<unk>|<pad>|<image>").unwrap()
});

/// Remove model-internal control tokens and surrounding whitespace.
///
/// Everything else in the generated text is kept as produced.
pub fn strip_control_tokens(raw: &str) -> String {
    CONTROL_TOKENS.replace_all(raw, "").trim().to_string()
}

/// Keep at most `max_chars` characters, cutting on a char boundary.
pub fn truncate_chars(text: String, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => {
            log::debug!("decode: truncating model output at {max_chars} chars");
            text[..cut].to_string()
        }
        None => text,
    }
}

/// Full decode step applied to every model response.
pub fn decode_output(raw: &str, max_chars: usize) -> String {
    truncate_chars(strip_control_tokens(raw), max_chars)
}
