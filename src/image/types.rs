//! Core types for image editing.

use crate::codec::EncodedAsset;

/// A request to edit one or more images with a text prompt.
///
/// Submission-side validation (at least one image, non-empty prompt) is the
/// caller's job; sessions enforce it before delegating. The requester sends
/// whatever it is given and surfaces the remote rejection if the input was
/// unacceptable.
#[derive(Debug, Clone)]
pub struct EditRequest {
    /// Source images, in the order they should appear in the request.
    pub images: Vec<EncodedAsset>,
    /// The editing instruction.
    pub prompt: String,
}

impl EditRequest {
    /// Creates a request with the given prompt and no images yet.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            images: Vec::new(),
            prompt: prompt.into(),
        }
    }

    /// Appends a source image.
    pub fn with_image(mut self, image: EncodedAsset) -> Self {
        self.images.push(image);
        self
    }

    /// Returns true if the request has at least one image and a non-empty
    /// prompt.
    pub fn is_submittable(&self) -> bool {
        !self.images.is_empty() && !self.prompt.trim().is_empty()
    }
}
