//! Veo video-generation client.
//!
//! Video generation is a server-side long-running operation: one call starts
//! the job, after which the returned operation handle is polled on a fixed
//! interval until `done`, then the finished asset is downloaded. The polling
//! loop carries an explicit attempt bound; exhausting it is an error, never a
//! silent spin.

use crate::auth::Credentials;
use crate::error::{NanoVeoError, Result};
use crate::image::DEFAULT_BASE_URL;
use crate::video::generator::VideoGenerator;
use crate::video::types::{GeneratedVideo, VideoEvent, VideoMetadata, VideoRequest};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Fixed wait between status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Maximum number of status polls before giving up (~200s at the default
/// interval).
pub const DEFAULT_MAX_POLLS: u32 = 20;

/// Veo model variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VeoModel {
    /// Veo 3.0 fast - short-video generation.
    #[default]
    Veo30FastGenerate,
}

impl VeoModel {
    /// Returns the API model identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Veo30FastGenerate => "veo-3.0-fast-generate-001",
        }
    }
}

/// Builder for [`VeoClient`].
#[derive(Debug, Clone)]
pub struct VeoClientBuilder {
    credentials: Option<Credentials>,
    model: VeoModel,
    base_url: Option<String>,
    poll_interval: Duration,
    max_polls: u32,
    progress: Option<mpsc::UnboundedSender<VideoEvent>>,
}

impl Default for VeoClientBuilder {
    fn default() -> Self {
        Self {
            credentials: None,
            model: VeoModel::default(),
            base_url: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_polls: DEFAULT_MAX_POLLS,
            progress: None,
        }
    }
}

impl VeoClientBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the credentials. Falls back to `GOOGLE_API_KEY` env var.
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Sets the Veo model variant.
    pub fn model(mut self, model: VeoModel) -> Self {
        self.model = model;
        self
    }

    /// Overrides the API base URL (tests point this at a mock server).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the fixed wait between status polls.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the maximum number of status polls before timing out.
    pub fn max_polls(mut self, max_polls: u32) -> Self {
        self.max_polls = max_polls;
        self
    }

    /// Attaches a progress-event channel.
    ///
    /// Sends are best-effort; a dropped receiver never aborts generation.
    pub fn progress(mut self, sender: mpsc::UnboundedSender<VideoEvent>) -> Self {
        self.progress = Some(sender);
        self
    }

    /// Builds the client, resolving credentials.
    pub fn build(self) -> Result<VeoClient> {
        let credentials = match self.credentials {
            Some(c) => c,
            None => Credentials::from_env()?,
        };

        Ok(VeoClient {
            client: reqwest::Client::new(),
            credentials,
            model: self.model,
            base_url: self
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            poll_interval: self.poll_interval,
            max_polls: self.max_polls,
            progress: self.progress,
        })
    }
}

/// Client for the Veo video-generation endpoints.
#[derive(Clone)]
pub struct VeoClient {
    client: reqwest::Client,
    credentials: Credentials,
    model: VeoModel,
    base_url: String,
    poll_interval: Duration,
    max_polls: u32,
    progress: Option<mpsc::UnboundedSender<VideoEvent>>,
}

impl VeoClient {
    /// Creates a new [`VeoClientBuilder`].
    pub fn builder() -> VeoClientBuilder {
        VeoClientBuilder::new()
    }

    /// Returns the configured poll interval.
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Returns the configured poll bound.
    pub fn max_polls(&self) -> u32 {
        self.max_polls
    }

    /// Runs generation on a spawned task, returning the event sequence:
    /// zero or more [`VideoEvent::Progress`] values followed by exactly one
    /// terminal [`VideoEvent::Finished`] or [`VideoEvent::Failed`].
    pub fn generate_streaming(
        &self,
        request: VideoRequest,
    ) -> mpsc::UnboundedReceiver<VideoEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut client = self.clone();
        client.progress = Some(tx.clone());
        tokio::spawn(async move {
            let terminal = match client.generate_impl(&request).await {
                Ok(video) => VideoEvent::Finished(video),
                Err(e) => VideoEvent::Failed(e),
            };
            let _ = tx.send(terminal);
        });
        rx
    }

    fn emit(&self, message: impl Into<String>) {
        if let Some(tx) = &self.progress {
            let _ = tx.send(VideoEvent::Progress(message.into()));
        }
    }

    async fn generate_impl(&self, request: &VideoRequest) -> Result<GeneratedVideo> {
        let started = Instant::now();

        self.emit("Starting video generation...");
        let mut operation = self.start(request).await?;
        tracing::debug!(operation = %operation.name, "submitted video generation job");

        // Poll on a fixed interval until done, under the attempt bound.
        let mut attempts: u32 = 0;
        while !operation.done.unwrap_or(false) {
            if attempts >= self.max_polls {
                return Err(NanoVeoError::PollTimeout {
                    attempts,
                    waited: self.poll_interval * attempts,
                });
            }
            attempts += 1;
            tokio::time::sleep(self.poll_interval).await;
            self.emit(format!(
                "Checking status (attempt {attempts}/{})...",
                self.max_polls
            ));
            operation = self.poll_status(&operation.name).await?;
            tracing::debug!(
                operation = %operation.name,
                attempt = attempts,
                elapsed_secs = started.elapsed().as_secs(),
                "polled video generation status"
            );
        }

        let uri = extract_video_uri(operation)?;
        tracing::debug!(uri = %uri, "video generation complete");

        let data = self.download(&uri).await?;
        self.emit("Video ready.");

        Ok(GeneratedVideo::new(
            data,
            "video/mp4",
            VideoMetadata {
                model: Some(self.model.as_str().to_string()),
                duration_ms: Some(started.elapsed().as_millis() as u64),
                polls: attempts,
            },
        ))
    }

    /// Issues the start-job call.
    async fn start(&self, request: &VideoRequest) -> Result<VeoOperation> {
        let url = format!(
            "{}/models/{}:predictLongRunning",
            self.base_url,
            self.model.as_str(),
        );

        let body = VeoStartRequest::from_request(request);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.credentials.api_key())
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| NanoVeoError::StartFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(NanoVeoError::StartFailed(format!(
                "HTTP {}: {}",
                status.as_u16(),
                text.trim()
            )));
        }

        response
            .json::<VeoOperation>()
            .await
            .map_err(|e| NanoVeoError::StartFailed(e.to_string()))
    }

    /// Re-fetches job status, round-tripping the operation name verbatim.
    async fn poll_status(&self, operation_name: &str) -> Result<VeoOperation> {
        let url = format!("{}/{}", self.base_url, operation_name);

        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", self.credentials.api_key())
            .send()
            .await
            .map_err(|e| NanoVeoError::PollFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(NanoVeoError::PollFailed(format!(
                "HTTP {}: {}",
                status.as_u16(),
                text.trim()
            )));
        }

        response
            .json::<VeoOperation>()
            .await
            .map_err(|e| NanoVeoError::PollFailed(e.to_string()))
    }

    /// Fetches the finished video, authenticating via the `key` query
    /// parameter the download endpoint requires.
    async fn download(&self, uri: &str) -> Result<Vec<u8>> {
        let url = if uri.contains('?') {
            format!("{}&key={}", uri, self.credentials.api_key())
        } else {
            format!("{}?key={}", uri, self.credentials.api_key())
        };

        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", self.credentials.api_key())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NanoVeoError::DownloadFailed(status.as_u16()));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

/// Classifies a completed operation and pulls out the download URI.
///
/// Order matters: an explicit job error outranks everything, then a safety
/// block, then emptiness checks.
fn extract_video_uri(operation: VeoOperation) -> Result<String> {
    if let Some(err) = operation.error {
        return Err(NanoVeoError::JobFailed(
            err.message.unwrap_or_else(|| "unknown job error".into()),
        ));
    }

    let response = operation.response.ok_or(NanoVeoError::EmptyResult)?;

    let videos = response.generated_videos.unwrap_or_default();
    if videos.is_empty() {
        if let Some(feedback) = response.prompt_feedback {
            if let Some(reason) = feedback.block_reason {
                return Err(NanoVeoError::ContentBlocked(reason));
            }
        }
        return Err(NanoVeoError::EmptyResult);
    }

    videos
        .into_iter()
        .next()
        .and_then(|v| v.video)
        .and_then(|v| v.uri)
        .ok_or_else(|| {
            NanoVeoError::UnexpectedResponse("no download link in video data".into())
        })
}

#[async_trait]
impl VideoGenerator for VeoClient {
    async fn generate(&self, request: &VideoRequest) -> Result<GeneratedVideo> {
        self.generate_impl(request).await
    }
}

// Request/Response wire types

#[derive(Debug, Serialize)]
struct VeoStartRequest {
    instances: Vec<VeoInstance>,
    parameters: VeoParameters,
}

#[derive(Debug, Serialize)]
struct VeoInstance {
    prompt: String,
    image: VeoImage,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VeoImage {
    image_bytes: String,
    mime_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VeoParameters {
    number_of_videos: u32,
    aspect_ratio: String,
}

impl VeoStartRequest {
    /// One instance, one output video, the request's aspect ratio.
    fn from_request(req: &VideoRequest) -> Self {
        Self {
            instances: vec![VeoInstance {
                prompt: req.prompt.clone(),
                image: VeoImage {
                    image_bytes: req.image.data.clone(),
                    mime_type: req.image.mime_type.clone(),
                },
            }],
            parameters: VeoParameters {
                number_of_videos: 1,
                aspect_ratio: req.aspect_ratio.as_str().to_string(),
            },
        }
    }
}

/// The opaque operation handle. `name` must be round-tripped verbatim to the
/// status endpoint.
#[derive(Debug, Deserialize)]
struct VeoOperation {
    name: String,
    #[serde(default)]
    done: Option<bool>,
    #[serde(default)]
    error: Option<VeoOperationError>,
    #[serde(default)]
    response: Option<VeoJobResponse>,
}

#[derive(Debug, Deserialize)]
struct VeoOperationError {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VeoJobResponse {
    #[serde(default)]
    generated_videos: Option<Vec<VeoGeneratedVideo>>,
    #[serde(default)]
    prompt_feedback: Option<VeoPromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct VeoGeneratedVideo {
    #[serde(default)]
    video: Option<VeoVideoRef>,
}

#[derive(Debug, Deserialize)]
struct VeoVideoRef {
    #[serde(default)]
    uri: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VeoPromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}
