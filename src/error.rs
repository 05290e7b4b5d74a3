//! Error kinds surfaced by the assessment core and its intake layer.
//!
//! Malformed vitals are not errors: they are parsed to `None` and skipped
//! (see [`crate::assessment::vitals`]).

use thiserror::Error;

// ---------------------------------------------------------------------------
// InferenceError
// ---------------------------------------------------------------------------

/// Errors raised by the model-backed path.
#[derive(Debug, Error)]
pub enum InferenceError {
    /// HTTP transport or connection error.
    #[error("model request failed: {0}")]
    Request(String),

    /// The generation did not complete within the configured timeout.
    #[error("model request timed out")]
    Timeout,

    /// The backend answered with a non-success status.
    #[error("model backend returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response could not be parsed as expected JSON.
    #[error("failed to parse model response: {0}")]
    Parse(String),

    /// The model produced no usable text.
    #[error("model returned an empty response")]
    EmptyResponse,
}

impl From<reqwest::Error> for InferenceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            InferenceError::Timeout
        } else {
            InferenceError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// AssessmentError
// ---------------------------------------------------------------------------

/// Failure of a whole assessment request.
///
/// The dispatcher forwards the underlying condition without translating it;
/// the caller renders the description into its failure response.
#[derive(Debug, Error)]
pub enum AssessmentError {
    #[error(transparent)]
    Inference(#[from] InferenceError),
}

// ---------------------------------------------------------------------------
// ImageDecodeError
// ---------------------------------------------------------------------------

/// The uploaded image could not be read or decoded.
///
/// Raised by [`crate::intake`] before a request reaches the core.
#[derive(Debug, Error)]
pub enum ImageDecodeError {
    #[error("could not read image file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("image file is empty")]
    Empty,

    #[error("invalid image data: {0}")]
    Decode(String),
}

impl From<image::ImageError> for ImageDecodeError {
    fn from(e: image::ImageError) -> Self {
        ImageDecodeError::Decode(e.to_string())
    }
}
