//! Video generation module.

mod generator;
mod types;
mod veo;

pub use generator::VideoGenerator;
pub use types::{
    AspectRatio, GeneratedVideo, VideoEvent, VideoMetadata, VideoRequest,
};
pub use veo::{
    VeoClient, VeoClientBuilder, VeoModel, DEFAULT_MAX_POLLS, DEFAULT_POLL_INTERVAL,
};
