//! Video generator trait.

use crate::error::Result;
use crate::video::types::{GeneratedVideo, VideoRequest};
use async_trait::async_trait;

/// Trait for video-generation backends.
///
/// A call runs the whole job lifecycle (start, poll to completion, download)
/// and is not retried internally; the only repetition inside is the status
/// polling loop, which is a designed wait for "not yet done", not a retry of
/// failures.
#[async_trait]
pub trait VideoGenerator: Send + Sync {
    /// Generates a video from the given request.
    async fn generate(&self, request: &VideoRequest) -> Result<GeneratedVideo>;
}
