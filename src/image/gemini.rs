//! Gemini image-editing client.

use crate::auth::Credentials;
use crate::codec::EncodedAsset;
use crate::error::{classify_http_error, NanoVeoError, Result};
use crate::image::editor::ImageEditor;
use crate::image::types::EditRequest;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Default base URL for the generative-language API.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini image model variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GeminiImageModel {
    /// Gemini 2.5 Flash image preview ("nano banana").
    #[default]
    FlashImagePreview,
}

impl GeminiImageModel {
    /// Returns the API model identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FlashImagePreview => "gemini-2.5-flash-image-preview",
        }
    }
}

/// Builder for [`GeminiEditor`].
#[derive(Debug, Clone, Default)]
pub struct GeminiEditorBuilder {
    credentials: Option<Credentials>,
    model: GeminiImageModel,
    base_url: Option<String>,
}

impl GeminiEditorBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the credentials. Falls back to `GOOGLE_API_KEY` env var.
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Sets the model variant.
    pub fn model(mut self, model: GeminiImageModel) -> Self {
        self.model = model;
        self
    }

    /// Overrides the API base URL (tests point this at a mock server).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Builds the editor, resolving credentials.
    pub fn build(self) -> Result<GeminiEditor> {
        let credentials = match self.credentials {
            Some(c) => c,
            None => Credentials::from_env()?,
        };

        Ok(GeminiEditor {
            client: reqwest::Client::new(),
            credentials,
            model: self.model,
            base_url: self
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        })
    }
}

/// Client for the Gemini image-editing endpoint.
#[derive(Clone)]
pub struct GeminiEditor {
    client: reqwest::Client,
    credentials: Credentials,
    model: GeminiImageModel,
    base_url: String,
}

impl GeminiEditor {
    /// Creates a new [`GeminiEditorBuilder`].
    pub fn builder() -> GeminiEditorBuilder {
        GeminiEditorBuilder::new()
    }

    async fn edit_impl(&self, request: &EditRequest) -> Result<EncodedAsset> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url,
            self.model.as_str(),
        );

        let body = GeminiRequest::from_edit_request(request);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.credentials.api_key())
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let text = response.text().await.unwrap_or_default();
            return Err(classify_http_error(status.as_u16(), &text, &headers));
        }

        let gemini_response: GeminiResponse = response.json().await?;
        interpret_response(gemini_response)
    }
}

/// Picks the result out of a decoded edit response.
///
/// First match wins: (1) the first inline-image part, scanning candidates and
/// parts in order; (2) else the first text part, treated as a rejection;
/// (3) else an explicit prompt-feedback block reason; (4) else empty.
fn interpret_response(response: GeminiResponse) -> Result<EncodedAsset> {
    let mut first_text: Option<String> = None;

    for candidate in response.candidates {
        let Some(content) = candidate.content else {
            continue;
        };
        for part in content.parts {
            if let Some(inline) = part.inline_data {
                return Ok(EncodedAsset {
                    mime_type: inline.mime_type,
                    data: inline.data,
                });
            }
            if first_text.is_none() {
                if let Some(text) = part.text {
                    let text = text.trim().to_string();
                    if !text.is_empty() {
                        first_text = Some(text);
                    }
                }
            }
        }
    }

    if let Some(text) = first_text {
        return Err(NanoVeoError::UnexpectedText(text));
    }

    if let Some(feedback) = response.prompt_feedback {
        if let Some(reason) = feedback.block_reason {
            return Err(NanoVeoError::ContentBlocked(reason));
        }
    }

    Err(NanoVeoError::EmptyResponse)
}

#[async_trait]
impl ImageEditor for GeminiEditor {
    async fn edit(&self, request: &EditRequest) -> Result<EncodedAsset> {
        self.edit_impl(request).await
    }
}

// Request/Response wire types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiRequestPart>,
}

/// A part in a Gemini request - either inline image data or text.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiRequestPart {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: GeminiInlineData,
    },
    Text {
        text: String,
    },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiConfig {
    response_modalities: Vec<String>,
}

impl GeminiRequest {
    /// All source images as ordered inlineData parts, then the prompt as a
    /// trailing text part.
    fn from_edit_request(req: &EditRequest) -> Self {
        let mut parts: Vec<GeminiRequestPart> = req
            .images
            .iter()
            .map(|asset| GeminiRequestPart::InlineData {
                inline_data: GeminiInlineData {
                    mime_type: asset.mime_type.clone(),
                    data: asset.data.clone(),
                },
            })
            .collect();

        parts.push(GeminiRequestPart::Text {
            text: req.prompt.clone(),
        });

        Self {
            contents: vec![GeminiContent { parts }],
            generation_config: GeminiConfig {
                response_modalities: vec!["IMAGE".to_string(), "TEXT".to_string()],
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContentResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPartResponse {
    #[serde(default)]
    inline_data: Option<GeminiInlineData>,
    #[serde(default)]
    text: Option<String>,
}
