//! Error types for the edit and video pipelines.

use std::time::Duration;

/// Errors that can occur while editing images or generating videos.
#[derive(Debug, thiserror::Error)]
pub enum NanoVeoError {
    /// API key missing, empty, or rejected by the service.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Failed to read or decode local binary data (file or base64).
    #[error("failed to decode: {0}")]
    Decode(String),

    /// The model answered with text instead of an edited image.
    #[error("model returned text instead of an image: {0}")]
    UnexpectedText(String),

    /// Content was blocked by safety filters.
    #[error("content blocked: {0}")]
    ContentBlocked(String),

    /// The edit response carried no image, no text, and no block reason.
    #[error("response contained no edited image")]
    EmptyResponse,

    /// The video job finished but produced zero videos.
    #[error("video job completed with no results")]
    EmptyResult,

    /// The start-job call for video generation failed.
    #[error("failed to start video generation: {0}")]
    StartFailed(String),

    /// A status poll failed at the transport or HTTP level.
    #[error("status poll failed: {0}")]
    PollFailed(String),

    /// The client-side poll bound was exhausted before the job finished.
    #[error("video generation still pending after {attempts} polls ({waited:?})")]
    PollTimeout {
        /// Number of status polls performed.
        attempts: u32,
        /// Total time spent waiting between polls.
        waited: Duration,
    },

    /// The completed video job carried an explicit error.
    #[error("video generation failed: {0}")]
    JobFailed(String),

    /// Downloading the finished video returned a non-success status.
    #[error("video download failed with HTTP status {0}")]
    DownloadFailed(u16),

    /// The response was well-formed JSON but missing expected fields.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Invalid request parameters (empty prompt, missing source image).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Suggested wait taken from the Retry-After header, if present.
        retry_after: Option<Duration>,
    },

    /// Network or HTTP transport error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error (e.g., saving a result to disk).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl NanoVeoError {
    /// Returns true if this error is likely transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::Network(_) | Self::PollTimeout { .. }
        )
    }

    /// Returns the suggested retry delay, if available.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => *retry_after,
            Self::Network(_) => Some(Duration::from_secs(2)),
            _ => None,
        }
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, NanoVeoError>;

/// Parses a `Retry-After` header value in integer-seconds form.
pub(crate) fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
}

/// Maps a non-success HTTP response to a classified error.
///
/// Already-classified conditions (auth, rate limit, safety block) get their
/// own variants; everything else becomes [`NanoVeoError::Api`] carrying the
/// status and body text.
pub(crate) fn classify_http_error(
    status: u16,
    body: &str,
    headers: &reqwest::header::HeaderMap,
) -> NanoVeoError {
    let message = body.trim().to_string();
    if status == 401 || status == 403 {
        return NanoVeoError::Auth(message);
    }
    if status == 429 {
        let retry_after = parse_retry_after(headers).map(Duration::from_secs);
        return NanoVeoError::RateLimited { retry_after };
    }
    let lower = message.to_lowercase();
    if lower.contains("safety")
        || lower.contains("blocked")
        || lower.contains("content_policy")
        || lower.contains("prohibited")
    {
        return NanoVeoError::ContentBlocked(message);
    }
    NanoVeoError::Api { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_retryable() {
        assert!(NanoVeoError::RateLimited { retry_after: None }.is_retryable());
        assert!(NanoVeoError::PollTimeout {
            attempts: 20,
            waited: Duration::from_secs(200),
        }
        .is_retryable());

        assert!(!NanoVeoError::Auth("bad key".into()).is_retryable());
        assert!(!NanoVeoError::ContentBlocked("nsfw".into()).is_retryable());
        assert!(!NanoVeoError::EmptyResponse.is_retryable());
        assert!(!NanoVeoError::JobFailed("quota".into()).is_retryable());
    }

    #[test]
    fn test_retry_after() {
        let rate_limited = NanoVeoError::RateLimited {
            retry_after: Some(Duration::from_secs(60)),
        };
        assert_eq!(rate_limited.retry_after(), Some(Duration::from_secs(60)));

        let auth = NanoVeoError::Auth("bad".into());
        assert_eq!(auth.retry_after(), None);
    }

    #[test]
    fn test_error_display() {
        let err = NanoVeoError::Api {
            status: 404,
            message: "Not found".into(),
        };
        assert_eq!(err.to_string(), "API error: 404 - Not found");

        let err = NanoVeoError::UnexpectedText("I cannot edit that.".into());
        assert_eq!(
            err.to_string(),
            "model returned text instead of an image: I cannot edit that."
        );

        let err = NanoVeoError::DownloadFailed(502);
        assert_eq!(
            err.to_string(),
            "video download failed with HTTP status 502"
        );
    }

    #[test]
    fn test_classify_http_error_auth() {
        let headers = reqwest::header::HeaderMap::new();
        assert!(matches!(
            classify_http_error(401, "invalid key", &headers),
            NanoVeoError::Auth(_)
        ));
        assert!(matches!(
            classify_http_error(403, "forbidden", &headers),
            NanoVeoError::Auth(_)
        ));
    }

    #[test]
    fn test_classify_http_error_rate_limited_with_header() {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(reqwest::header::RETRY_AFTER, "30".parse().unwrap());
        match classify_http_error(429, "slow down", &headers) {
            NanoVeoError::RateLimited { retry_after } => {
                assert_eq!(retry_after, Some(Duration::from_secs(30)));
            }
            other => panic!("expected RateLimited, got: {other:?}"),
        }
    }

    #[test]
    fn test_classify_http_error_safety_keywords() {
        let headers = reqwest::header::HeaderMap::new();
        assert!(matches!(
            classify_http_error(400, "request blocked by safety system", &headers),
            NanoVeoError::ContentBlocked(_)
        ));
    }

    #[test]
    fn test_classify_http_error_generic() {
        let headers = reqwest::header::HeaderMap::new();
        match classify_http_error(500, "internal", &headers) {
            NanoVeoError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "internal");
            }
            other => panic!("expected Api, got: {other:?}"),
        }
    }
}
