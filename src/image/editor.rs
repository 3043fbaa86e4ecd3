//! Image editor trait and utilities.

use crate::codec::EncodedAsset;
use crate::error::Result;
use crate::image::types::EditRequest;
use async_trait::async_trait;

/// Trait for image-editing backends.
///
/// Sessions depend on this seam rather than on a concrete client, which also
/// keeps the pipeline controllers testable without a network.
#[async_trait]
pub trait ImageEditor: Send + Sync {
    /// Edits the request's images per its prompt, returning the edited image.
    ///
    /// Exactly one attempt per call; retry policy belongs to the caller.
    async fn edit(&self, request: &EditRequest) -> Result<EncodedAsset>;
}

/// Extension trait adding caller-side retry logic.
#[async_trait]
pub trait ImageEditorExt: ImageEditor {
    /// Edits with automatic retries on transient failures.
    async fn edit_with_retries(
        &self,
        request: &EditRequest,
        max_retries: u32,
    ) -> Result<EncodedAsset> {
        let mut last_error = None;

        for attempt in 0..=max_retries {
            match self.edit(request).await {
                Ok(image) => return Ok(image),
                Err(e) if e.is_retryable() && attempt < max_retries => {
                    let delay = e.retry_after().unwrap_or(std::time::Duration::from_secs(1));
                    tracing::warn!(
                        attempt = attempt + 1,
                        max_retries,
                        delay_ms = delay.as_millis(),
                        "retrying after transient error: {e}"
                    );
                    tokio::time::sleep(delay).await;
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.expect("should have error after retries"))
    }
}

impl<T: ImageEditor> ImageEditorExt for T {}
