//! Core types for video generation.

use crate::codec::EncodedAsset;
use crate::error::{NanoVeoError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Common aspect ratios for video generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    /// 16:9 landscape (widescreen).
    #[serde(rename = "16:9")]
    Landscape,
    /// 9:16 portrait (tall). The default for this service's short-video flow.
    #[serde(rename = "9:16")]
    Portrait,
}

impl AspectRatio {
    /// Returns the aspect ratio as a string (e.g., "9:16").
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Landscape => "16:9",
            Self::Portrait => "9:16",
        }
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        Self::Portrait
    }
}

impl std::fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A request to generate a short video from one source image and a prompt.
#[derive(Debug, Clone)]
pub struct VideoRequest {
    /// The animation instruction.
    pub prompt: String,
    /// The single source image.
    pub image: EncodedAsset,
    /// Output aspect ratio.
    pub aspect_ratio: AspectRatio,
}

impl VideoRequest {
    /// Creates a new request with the default aspect ratio.
    pub fn new(prompt: impl Into<String>, image: EncodedAsset) -> Self {
        Self {
            prompt: prompt.into(),
            image,
            aspect_ratio: AspectRatio::default(),
        }
    }

    /// Sets the aspect ratio.
    pub fn with_aspect_ratio(mut self, ratio: AspectRatio) -> Self {
        self.aspect_ratio = ratio;
        self
    }

    /// Returns true if the prompt is non-empty.
    pub fn is_submittable(&self) -> bool {
        !self.prompt.trim().is_empty()
    }
}

/// Metadata about the video generation process.
#[derive(Debug, Clone, Default)]
pub struct VideoMetadata {
    /// Model used for generation.
    pub model: Option<String>,
    /// Wall-clock generation duration in milliseconds.
    pub duration_ms: Option<u64>,
    /// Number of status polls performed.
    pub polls: u32,
}

/// A generated video with its data and metadata.
#[derive(Debug, Clone)]
pub struct GeneratedVideo {
    /// Raw video bytes.
    pub data: Vec<u8>,
    /// MIME type (e.g., "video/mp4").
    pub mime_type: String,
    /// Generation metadata.
    pub metadata: VideoMetadata,
}

impl GeneratedVideo {
    /// Creates a new generated video.
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>, metadata: VideoMetadata) -> Self {
        Self {
            data,
            mime_type: mime_type.into(),
            metadata,
        }
    }

    /// Returns the size of the video data in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Saves the video to the specified path.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, &self.data)?;
        Ok(())
    }

    /// Encodes the video data as base64.
    pub fn to_base64(&self) -> String {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD.encode(&self.data)
    }

    /// Returns the video as a data URL.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }
}

/// An event in the video-generation sequence.
///
/// Streaming consumers receive zero or more `Progress` events followed by
/// exactly one terminal `Finished` or `Failed` event.
#[derive(Debug)]
pub enum VideoEvent {
    /// A human-readable progress update.
    Progress(String),
    /// Terminal: generation succeeded.
    Finished(GeneratedVideo),
    /// Terminal: generation failed.
    Failed(NanoVeoError),
}
