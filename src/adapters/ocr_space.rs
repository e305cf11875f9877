use crate::domain::model::ImageBuffer;
use crate::domain::ports::TextExtractor;
use crate::utils::error::{PipelineError, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;

const DEFAULT_ENDPOINT: &str = "https://api.ocr.space/parse/image";

/// Hosted OCR backend talking to the OCR.space parse API.
pub struct OcrSpaceClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct OcrSpaceResponse {
    #[serde(rename = "IsErroredOnProcessing", default)]
    is_errored_on_processing: bool,
    #[serde(rename = "ErrorMessage", default)]
    error_message: Option<Vec<String>>,
    #[serde(rename = "ParsedResults", default)]
    parsed_results: Option<Vec<ParsedResult>>,
}

#[derive(Debug, Deserialize)]
struct ParsedResult {
    #[serde(rename = "ParsedText", default)]
    parsed_text: Option<String>,
}

impl OcrSpaceClient {
    /// Fails fast when the API key is missing, before any request is made.
    pub fn new(api_key: Option<String>) -> Result<Self> {
        let api_key = api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| PipelineError::config("OCR_SPACE_API_KEY is not set"))?;

        Ok(Self {
            client: Client::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key,
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl TextExtractor for OcrSpaceClient {
    async fn extract(&self, image: &ImageBuffer) -> Result<String> {
        let part = Part::bytes(image.bytes.clone())
            .file_name("receipt.jpg")
            .mime_str(&image.mime_type)
            .map_err(|e| PipelineError::ocr(format!("Invalid image mime type: {}", e)))?;
        let form = Form::new().part("file", part);

        tracing::debug!("Sending {} byte image to OCR.space", image.bytes.len());
        // Transport failures are OCR failures to the rest of the pipeline;
        // the reqwest detail stays here.
        let response = self
            .client
            .post(&self.endpoint)
            .header("apikey", &self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| PipelineError::ocr(format!("OCR API request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::ocr(format!(
                "OCR API request failed: {}",
                status
            )));
        }

        let payload: OcrSpaceResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::ocr(format!("OCR API returned invalid payload: {}", e)))?;

        if payload.is_errored_on_processing {
            let message = payload
                .error_message
                .and_then(|messages| messages.into_iter().next())
                .unwrap_or_else(|| "OCR API processing error".to_string());
            return Err(PipelineError::ocr(message));
        }

        Ok(payload
            .parsed_results
            .and_then(|results| results.into_iter().next())
            .and_then(|result| result.parsed_text)
            .unwrap_or_default())
    }
}
