//! Binary-to-base64 codec utilities.
//!
//! Images travel to the API as base64 text paired with a MIME type
//! ([`EncodedAsset`]); results come back the same way and can be decoded to
//! bytes, written to disk, or rendered as a `data:` URL.

use crate::error::{NanoVeoError, Result};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG format (lossless).
    #[default]
    Png,
    /// JPEG format (lossy).
    Jpeg,
    /// WebP format (modern, efficient).
    WebP,
}

impl ImageFormat {
    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::WebP => "webp",
        }
    }

    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
        }
    }

    /// Attempts to detect format from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Attempts to detect format from a MIME type string.
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        match mime {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Detects image format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 12 {
            return None;
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }

        None
    }
}

/// Binary image data in text-safe transport form: MIME type + base64 payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedAsset {
    /// MIME type (e.g., "image/png").
    pub mime_type: String,
    /// Base64-encoded binary payload (standard alphabet, padded).
    pub data: String,
}

impl EncodedAsset {
    /// Creates an asset from raw bytes, detecting the MIME type from magic
    /// bytes. Fails with [`NanoVeoError::Decode`] on an unrecognized format.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let format = ImageFormat::from_magic_bytes(bytes)
            .ok_or_else(|| NanoVeoError::Decode("unrecognized image format".into()))?;
        Ok(Self {
            mime_type: format.mime_type().to_string(),
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
        })
    }

    /// Creates an asset from an explicit MIME type and raw bytes.
    pub fn from_parts(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
        }
    }

    /// Reads and encodes a local image file.
    ///
    /// Fails with [`NanoVeoError::Decode`] if the file cannot be read or is
    /// not a recognized image format.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| NanoVeoError::Decode(format!("{}: {e}", path.display())))?;
        Self::from_bytes(&bytes)
    }

    /// Decodes the base64 payload back to raw bytes.
    pub fn decode(&self) -> Result<Vec<u8>> {
        base64::engine::general_purpose::STANDARD
            .decode(&self.data)
            .map_err(|e| NanoVeoError::Decode(e.to_string()))
    }

    /// Returns the image format, if the MIME type is one we recognize.
    pub fn format(&self) -> Option<ImageFormat> {
        ImageFormat::from_mime_type(&self.mime_type)
    }

    /// Renders the asset as a `data:` URL.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    /// Parses a `data:{mime};base64,{payload}` URL.
    ///
    /// This is the handoff format used to carry an edited image from the
    /// edit flow into the video flow.
    pub fn from_data_url(url: &str) -> Result<Self> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| NanoVeoError::Decode("not a data URL".into()))?;
        let (mime_type, payload) = rest
            .split_once(";base64,")
            .ok_or_else(|| NanoVeoError::Decode("data URL is not base64-encoded".into()))?;
        if mime_type.is_empty() {
            return Err(NanoVeoError::Decode("data URL has no MIME type".into()));
        }
        Ok(Self {
            mime_type: mime_type.to_string(),
            data: payload.to_string(),
        })
    }

    /// Decodes the payload and writes it to the given path.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.decode()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}
