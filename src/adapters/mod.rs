// Adapters layer: concrete implementations for external systems (OCR engines,
// the generative model API, counter storage).

pub mod gemini;
pub mod memory_store;
pub mod ocr_local;
pub mod ocr_space;

use crate::domain::model::{ImageBuffer, OcrMode};
use crate::domain::ports::TextExtractor;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Tagged choice between the two OCR backends. The pipeline only sees the
/// `TextExtractor` capability.
pub enum OcrEngine {
    Local(ocr_local::LocalOcr),
    Hosted(ocr_space::OcrSpaceClient),
}

impl OcrEngine {
    pub fn for_mode(
        mode: OcrMode,
        ocr_space_api_key: Option<String>,
        ocr_space_endpoint: Option<String>,
    ) -> Result<Self> {
        match mode {
            OcrMode::Local => Ok(OcrEngine::Local(ocr_local::LocalOcr::new())),
            OcrMode::Hosted => {
                let mut client = ocr_space::OcrSpaceClient::new(ocr_space_api_key)?;
                if let Some(endpoint) = ocr_space_endpoint {
                    client = client.with_endpoint(endpoint);
                }
                Ok(OcrEngine::Hosted(client))
            }
        }
    }
}

#[async_trait]
impl TextExtractor for OcrEngine {
    async fn extract(&self, image: &ImageBuffer) -> Result<String> {
        match self {
            OcrEngine::Local(local) => local.extract(image).await,
            OcrEngine::Hosted(hosted) => hosted.extract(image).await,
        }
    }
}
