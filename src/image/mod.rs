//! Image editing module.

mod editor;
mod gemini;
mod types;

pub use editor::{ImageEditor, ImageEditorExt};
pub use gemini::{GeminiEditor, GeminiEditorBuilder, GeminiImageModel, DEFAULT_BASE_URL};
pub use types::EditRequest;
