use crate::domain::model::{Extraction, ImageBuffer};
use crate::domain::ports::{StructuredExtractor, TextExtractor};
use crate::utils::error::{PipelineError, Result};
use std::sync::Arc;

/// Receipt extraction orchestrator: fans a batch of images out to the OCR
/// backend, merges the texts in input order, and hands the blob to the
/// structured extractor.
pub struct ReceiptPipeline<O, S> {
    ocr: Arc<O>,
    extractor: S,
}

impl<O, S> ReceiptPipeline<O, S>
where
    O: TextExtractor + 'static,
    S: StructuredExtractor,
{
    pub fn new(ocr: O, extractor: S) -> Self {
        Self {
            ocr: Arc::new(ocr),
            extractor,
        }
    }

    pub async fn process_images(&self, images: Vec<ImageBuffer>) -> Result<Extraction> {
        if images.is_empty() {
            return Err(PipelineError::NoFilesError);
        }

        tracing::debug!("Dispatching OCR for {} image(s)", images.len());
        let handles: Vec<_> = images
            .into_iter()
            .enumerate()
            .map(|(index, image)| {
                let ocr = Arc::clone(&self.ocr);
                tokio::spawn(async move {
                    let text = ocr.extract(&image).await?;
                    tracing::debug!("OCR finished for image {} ({} chars)", index, text.len());
                    Ok::<String, PipelineError>(text)
                })
            })
            .collect();

        // Awaiting the handles in submission order keeps the merged text in
        // input order no matter which call finishes first. Any single failure
        // aborts the batch; partial receipts are never assembled.
        let mut texts = Vec::with_capacity(handles.len());
        for handle in handles {
            texts.push(handle.await??);
        }

        let merged = texts.join("\n\n");
        tracing::debug!("Merged OCR text is {} chars", merged.len());

        self.extractor.extract_structured(&merged).await
    }
}
