//! Image editing and image-to-video generation on top of Google's
//! generative media APIs.
//!
//! The crate pairs a Gemini image-edit client with a Veo video client and
//! wires them together behind small trait seams:
//!
//! - [`codec`] holds the base64 asset representation both flows exchange.
//! - [`image`] edits images with Gemini via the [`image::ImageEditor`] trait.
//! - [`video`] animates an image with Veo, polling the long-running job at a
//!   fixed interval and streaming progress as [`video::VideoEvent`]s.
//! - [`session`] is the stateful pipeline layer: prompt and source handling,
//!   result history, and a staleness guard so a reset session never displays
//!   a late-arriving result.
//!
//! # Example
//!
//! ```no_run
//! use nanoveo::codec::EncodedAsset;
//! use nanoveo::image::{EditRequest, GeminiEditor, ImageEditor};
//! use nanoveo::video::{VeoClient, VideoGenerator, VideoRequest};
//!
//! # async fn run() -> nanoveo::Result<()> {
//! let image = EncodedAsset::from_file("cat.png")?;
//!
//! let editor = GeminiEditor::builder().build()?;
//! let request = EditRequest::new("add a tiny wizard hat").with_image(image);
//! let edited = editor.edit(&request).await?;
//!
//! let veo = VeoClient::builder().build()?;
//! let video = veo
//!     .generate(&VideoRequest::new("make the cat blink", edited))
//!     .await?;
//! video.save("cat.mp4")?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod auth;
pub mod codec;
pub mod error;
pub mod image;
pub mod session;
pub mod video;

pub use auth::Credentials;
pub use codec::EncodedAsset;
pub use error::{NanoVeoError, Result};

/// Convenience imports for typical use of the crate.
pub mod prelude {
    pub use crate::auth::Credentials;
    pub use crate::codec::{EncodedAsset, ImageFormat};
    pub use crate::error::{NanoVeoError, Result};
    pub use crate::image::{EditRequest, GeminiEditor, ImageEditor, ImageEditorExt};
    pub use crate::session::{EditSession, SessionState, VideoSession};
    pub use crate::video::{
        AspectRatio, GeneratedVideo, VeoClient, VideoEvent, VideoGenerator, VideoRequest,
    };
}
