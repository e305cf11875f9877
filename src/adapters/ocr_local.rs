//! In-process OCR backend. Gated behind the `ocr` cargo feature so the crate
//! links without system tesseract/leptonica; the stub returns a configuration
//! error instead.

use crate::domain::model::ImageBuffer;
use crate::domain::ports::TextExtractor;
use crate::utils::error::Result;
use async_trait::async_trait;

const OCR_LANGUAGE: &str = "eng";

/// Local Tesseract backend. The engine holds non-trivial memory, so an
/// instance is created, used, and dropped inside each call rather than
/// pooled across requests.
pub struct LocalOcr {
    language: String,
}

impl LocalOcr {
    pub fn new() -> Self {
        Self {
            language: OCR_LANGUAGE.to_string(),
        }
    }
}

impl Default for LocalOcr {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "ocr")]
mod engine {
    use super::*;
    use crate::utils::error::PipelineError;
    use leptess::LepTess;

    pub fn recognize(language: &str, bytes: &[u8]) -> Result<String> {
        // Scoped to this call: LepTess drops (and frees the engine) on every
        // exit path, including the error ones.
        let mut engine = LepTess::new(None, language)
            .map_err(|e| PipelineError::ocr(format!("tesseract init: {}", e)))?;
        engine
            .set_image_from_mem(bytes)
            .map_err(|e| PipelineError::ocr(format!("tesseract set image: {}", e)))?;
        engine
            .get_utf8_text()
            .map_err(|e| PipelineError::ocr(format!("tesseract recognize: {}", e)))
    }
}

#[cfg(not(feature = "ocr"))]
mod engine {
    use super::*;
    use crate::utils::error::PipelineError;

    pub fn recognize(_language: &str, _bytes: &[u8]) -> Result<String> {
        Err(PipelineError::config(
            "Local OCR not built; rebuild with --features ocr and install tesseract/leptonica",
        ))
    }
}

#[async_trait]
impl TextExtractor for LocalOcr {
    async fn extract(&self, image: &ImageBuffer) -> Result<String> {
        let language = self.language.clone();
        let bytes = image.bytes.clone();

        // The recognition pass is CPU-bound and can take seconds; keep it off
        // the async scheduler so one slow image does not stall other requests.
        tokio::task::spawn_blocking(move || engine::recognize(&language, &bytes)).await?
    }
}
