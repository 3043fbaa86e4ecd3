//! API credentials shared by the edit and video clients.
//!
//! A [`Credentials`] value is constructed once and injected into every client
//! builder; there is no process-wide credential state. Replacing the key
//! means building a new value and new clients from it.

use crate::error::{NanoVeoError, Result};

/// Environment variable consulted by [`Credentials::from_env`].
pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";

/// A validated API key for the Google generative-media endpoints.
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
}

impl Credentials {
    /// Creates credentials from an explicit key.
    ///
    /// Fails with [`NanoVeoError::Auth`] if the key is empty or whitespace.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        let trimmed = api_key.trim();
        if trimmed.is_empty() {
            return Err(NanoVeoError::Auth("API key is empty".into()));
        }
        Ok(Self {
            api_key: trimmed.to_string(),
        })
    }

    /// Creates credentials from the `GOOGLE_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let key = std::env::var(API_KEY_ENV)
            .map_err(|_| NanoVeoError::Auth(format!("{API_KEY_ENV} not set")))?;
        Self::new(key)
    }

    /// Returns the raw API key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

// Keys must never end up in logs or panic messages.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .finish()
    }
}
