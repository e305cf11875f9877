#[cfg(feature = "cli")]
pub mod cli;

#[cfg(feature = "cli")]
pub use cli::CliConfig;

use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty, validate_url, Validate};
use std::env;

/// Credentials and model selection, read from the environment once at
/// startup and injected into the adapters that need them.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub ocr_space_api_key: Option<String>,
    /// Override for the hosted OCR endpoint, e.g. a self-hosted OCR.space
    /// instance. Defaults to the public API when unset.
    pub ocr_space_endpoint: Option<String>,
    pub gemini_api_key: Option<String>,
    pub gemini_model: Option<String>,
}

impl Settings {
    pub fn from_env() -> Self {
        Self {
            ocr_space_api_key: env::var("OCR_SPACE_API_KEY").ok(),
            ocr_space_endpoint: env::var("OCR_SPACE_ENDPOINT").ok(),
            gemini_api_key: env::var("GEMINI_API_KEY").ok(),
            gemini_model: env::var("GEMINI_MODEL").ok(),
        }
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        if let Some(key) = &self.ocr_space_api_key {
            validate_non_empty("OCR_SPACE_API_KEY", key)?;
        }
        if let Some(endpoint) = &self.ocr_space_endpoint {
            validate_url("OCR_SPACE_ENDPOINT", endpoint)?;
        }
        if let Some(key) = &self.gemini_api_key {
            validate_non_empty("GEMINI_API_KEY", key)?;
        }

        Ok(())
    }
}
