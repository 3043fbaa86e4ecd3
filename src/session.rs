//! Pipeline controllers for the edit and video flows.
//!
//! A session owns everything one flow displays: source assets, prompt,
//! current result, history, and busy/error state. Mutation is single-writer
//! (`&mut self` throughout). Submissions are two-phase: `begin_submit`
//! captures the session epoch in a token, `finish_submit` applies an outcome
//! only if that epoch is still current, so a reset in between makes the
//! late-arriving outcome a no-op instead of clobbering newer state.

use crate::codec::EncodedAsset;
use crate::error::{NanoVeoError, Result};
use crate::image::{EditRequest, ImageEditor};
use crate::video::{AspectRatio, GeneratedVideo, VideoGenerator, VideoRequest};

/// User-facing phase of a session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Ready for input.
    #[default]
    Idle,
    /// A submission is in flight; further submissions are rejected.
    Submitting,
    /// The last submission failed with this message. Still interactive.
    Failed(String),
}

/// Binds an in-flight submission to the epoch it started in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitToken {
    epoch: u64,
}

/// Outcome of an edit submission, fed back through `finish_submit`.
#[derive(Debug)]
pub enum EditOutcome {
    /// The endpoint returned an edited image.
    Edited(EncodedAsset),
    /// The submission failed with this message.
    Failed(String),
}

/// Session state for the image-edit flow.
#[derive(Debug, Default)]
pub struct EditSession {
    sources: Vec<EncodedAsset>,
    prompt: String,
    result: Option<EncodedAsset>,
    history: Vec<EncodedAsset>,
    state: SessionState,
    epoch: u64,
}

impl EditSession {
    /// Creates an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a source image.
    pub fn add_source(&mut self, asset: EncodedAsset) {
        self.sources.push(asset);
    }

    /// Sets the editing prompt.
    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    /// Returns the current prompt.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Returns the uploaded source images.
    pub fn sources(&self) -> &[EncodedAsset] {
        &self.sources
    }

    /// Returns the current state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Returns true while a submission is in flight.
    pub fn is_busy(&self) -> bool {
        self.state == SessionState::Submitting
    }

    /// Returns the message of the last failure, if the session is in the
    /// failed state.
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            SessionState::Failed(msg) => Some(msg),
            _ => None,
        }
    }

    /// Returns the currently displayed result.
    pub fn result(&self) -> Option<&EncodedAsset> {
        self.result.as_ref()
    }

    /// Returns past results, most recent first.
    pub fn history(&self) -> &[EncodedAsset] {
        &self.history
    }

    /// Re-displays a history entry as the current result. No remote call.
    /// Returns false if the index is out of range.
    pub fn select_history(&mut self, index: usize) -> bool {
        match self.history.get(index) {
            Some(asset) => {
                self.result = Some(asset.clone());
                true
            }
            None => false,
        }
    }

    /// Starts a submission: validates inputs, marks the session busy, and
    /// returns the request along with the token `finish_submit` needs.
    pub fn begin_submit(&mut self) -> Result<(SubmitToken, EditRequest)> {
        if self.is_busy() {
            return Err(NanoVeoError::InvalidRequest(
                "a submission is already in flight".into(),
            ));
        }
        if self.sources.is_empty() {
            return Err(NanoVeoError::InvalidRequest(
                "upload an image before submitting".into(),
            ));
        }
        if self.prompt.trim().is_empty() {
            return Err(NanoVeoError::InvalidRequest(
                "provide an editing prompt before submitting".into(),
            ));
        }

        let mut request = EditRequest::new(self.prompt.clone());
        request.images = self.sources.clone();
        self.state = SessionState::Submitting;
        Ok((SubmitToken { epoch: self.epoch }, request))
    }

    /// Applies a submission outcome. Returns false (and changes nothing) if
    /// the token's epoch is stale, i.e. the session was reset meanwhile.
    pub fn finish_submit(&mut self, token: SubmitToken, outcome: EditOutcome) -> bool {
        if token.epoch != self.epoch {
            return false;
        }
        match outcome {
            EditOutcome::Edited(asset) => {
                self.result = Some(asset.clone());
                self.history.insert(0, asset);
                self.state = SessionState::Idle;
            }
            EditOutcome::Failed(message) => {
                self.state = SessionState::Failed(message);
            }
        }
        true
    }

    /// Validates, delegates to the editor, and records the outcome.
    pub async fn submit<E: ImageEditor + ?Sized>(&mut self, editor: &E) -> Result<()> {
        let (token, request) = self.begin_submit()?;
        match editor.edit(&request).await {
            Ok(asset) => {
                self.finish_submit(token, EditOutcome::Edited(asset));
                Ok(())
            }
            Err(e) => {
                self.finish_submit(token, EditOutcome::Failed(e.to_string()));
                Err(e)
            }
        }
    }

    /// Returns the session to idle, discarding inputs and the displayed
    /// result. Any still-in-flight outcome becomes stale.
    pub fn reset(&mut self) {
        self.epoch += 1;
        self.sources.clear();
        self.prompt.clear();
        self.result = None;
        self.state = SessionState::Idle;
    }
}

/// Outcome of a video submission, fed back through `finish_submit`.
#[derive(Debug)]
pub enum VideoOutcome {
    /// Generation produced a video.
    Generated(GeneratedVideo),
    /// The submission failed with this message.
    Failed(String),
}

/// Session state for the video-generation flow.
#[derive(Debug, Default)]
pub struct VideoSession {
    source: Option<EncodedAsset>,
    prompt: String,
    video: Option<GeneratedVideo>,
    last_progress: Option<String>,
    aspect_ratio: AspectRatio,
    state: SessionState,
    epoch: u64,
}

impl VideoSession {
    /// Creates an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source image, discarding any previous result.
    pub fn set_source(&mut self, asset: EncodedAsset) {
        self.source = Some(asset);
        self.video = None;
        if matches!(self.state, SessionState::Failed(_)) {
            self.state = SessionState::Idle;
        }
    }

    /// Adopts an edited image handed over from the edit flow.
    pub fn adopt_edited(&mut self, asset: EncodedAsset) {
        self.set_source(asset);
    }

    /// Sets the animation prompt.
    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    /// Sets the output aspect ratio.
    pub fn set_aspect_ratio(&mut self, ratio: AspectRatio) {
        self.aspect_ratio = ratio;
    }

    /// Returns the source image, if one is set.
    pub fn source(&self) -> Option<&EncodedAsset> {
        self.source.as_ref()
    }

    /// Returns the current state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Returns true while a submission is in flight.
    pub fn is_busy(&self) -> bool {
        self.state == SessionState::Submitting
    }

    /// Returns the message of the last failure, if any.
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            SessionState::Failed(msg) => Some(msg),
            _ => None,
        }
    }

    /// Returns the generated video, if one is available.
    pub fn video(&self) -> Option<&GeneratedVideo> {
        self.video.as_ref()
    }

    /// Returns the most recent progress message.
    pub fn last_progress(&self) -> Option<&str> {
        self.last_progress.as_deref()
    }

    /// Records a progress message from the generation event stream.
    pub fn record_progress(&mut self, message: impl Into<String>) {
        self.last_progress = Some(message.into());
    }

    /// Starts a submission: validates inputs, marks the session busy, and
    /// returns the request along with the token `finish_submit` needs.
    pub fn begin_submit(&mut self) -> Result<(SubmitToken, VideoRequest)> {
        if self.is_busy() {
            return Err(NanoVeoError::InvalidRequest(
                "a submission is already in flight".into(),
            ));
        }
        let Some(source) = self.source.clone() else {
            return Err(NanoVeoError::InvalidRequest(
                "provide a source image before submitting".into(),
            ));
        };
        if self.prompt.trim().is_empty() {
            return Err(NanoVeoError::InvalidRequest(
                "provide a prompt before submitting".into(),
            ));
        }

        let request =
            VideoRequest::new(self.prompt.clone(), source).with_aspect_ratio(self.aspect_ratio);
        self.state = SessionState::Submitting;
        Ok((SubmitToken { epoch: self.epoch }, request))
    }

    /// Applies a submission outcome. Returns false (and changes nothing) if
    /// the token's epoch is stale.
    pub fn finish_submit(&mut self, token: SubmitToken, outcome: VideoOutcome) -> bool {
        if token.epoch != self.epoch {
            return false;
        }
        match outcome {
            VideoOutcome::Generated(video) => {
                self.video = Some(video);
                self.state = SessionState::Idle;
            }
            VideoOutcome::Failed(message) => {
                self.state = SessionState::Failed(message);
            }
        }
        self.last_progress = None;
        true
    }

    /// Validates, delegates to the generator, and records the outcome.
    pub async fn submit<G: VideoGenerator + ?Sized>(&mut self, generator: &G) -> Result<()> {
        let (token, request) = self.begin_submit()?;
        match generator.generate(&request).await {
            Ok(video) => {
                self.finish_submit(token, VideoOutcome::Generated(video));
                Ok(())
            }
            Err(e) => {
                self.finish_submit(token, VideoOutcome::Failed(e.to_string()));
                Err(e)
            }
        }
    }

    /// Returns the session to idle, discarding inputs and the result. Any
    /// still-in-flight outcome becomes stale.
    pub fn reset(&mut self) {
        self.epoch += 1;
        self.source = None;
        self.prompt.clear();
        self.video = None;
        self.last_progress = None;
        self.state = SessionState::Idle;
    }
}
