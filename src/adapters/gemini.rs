use crate::domain::model::Extraction;
use crate::domain::ports::StructuredExtractor;
use crate::utils::error::{PipelineError, Result};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// The output contract. The embedded example is the shape the model is held
/// to; field names and types here are load-bearing.
const RECEIPT_PARSING_INSTRUCTION: &str = r#"You will receive OCR output of a receipt.
Your only task is to return an itemized list in JSON format, following the structure exactly as shown in the example.
Do not include any extra text, explanation, or commentary.
Do not write "Here is the JSON" or anything else.
The Response JSON must exactly match the format below:
{
  "date_time": "2017-07-28T02:39:48",
  "items": [
      {"name": "PET TOY", "price": 1.97, "quantity": 1},
      {"name": "FLOPPY PUPPY", "price": 1.97, "quantity": 1},
      {"name": "PED PCH", "price": 0.50, "quantity": 2}
  ],
  "coupons": [
      {"applied_to": "PED PCH 1", "amount": 1.00, "description": "COUPON 23100"},
      {"applied_to": "STKO SUNFLWR", "amount": 0.50, "description": "COUPON 23101"},
      {"applied_to": "STKO SUNFLWR", "amount": 0.25, "description": "COUPON 23102"}
  ],
  "tax": 4.59,
  "tips": 0.00,
  "subtotal": 93.62,
  "total": 98.21,
  "payment_method": "VISA Debit"
}"#;

/// Structured-extraction client for the Gemini generateContent API.
pub struct GeminiClient {
    client: Client,
    api_base: String,
    api_key: String,
    model: String,
    fence_re: Regex,
    leading_ticks_re: Regex,
    trailing_ticks_re: Regex,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>, model: Option<String>) -> Result<Self> {
        let api_key = api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| PipelineError::config("GEMINI_API_KEY is not set"))?;

        Ok(Self {
            client: Client::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            fence_re: Regex::new(r"(?is)```(?:json)?\s*(.*?)\s*```").unwrap(),
            leading_ticks_re: Regex::new(r"^`+").unwrap(),
            trailing_ticks_re: Regex::new(r"`+$").unwrap(),
        })
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Models do not reliably honor "no markdown": prefer the inner content
    /// of a code fence, otherwise strip stray backtick runs from the edges.
    fn recover_json_payload(&self, raw: &str) -> String {
        if let Some(captures) = self.fence_re.captures(raw) {
            return captures[1].trim().to_string();
        }

        let stripped = self.leading_ticks_re.replace(raw, "");
        let stripped = self.trailing_ticks_re.replace(&stripped, "");
        stripped.trim().to_string()
    }
}

#[async_trait]
impl StructuredExtractor for GeminiClient {
    async fn extract_structured(&self, text: &str) -> Result<Extraction> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.api_base, self.model, self.api_key
        );
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": text }] }],
            "systemInstruction": { "parts": [{ "text": RECEIPT_PARSING_INSTRUCTION }] },
        });

        tracing::debug!("Requesting structured extraction from {}", self.model);
        // A failed AI call is an extraction failure to the caller. The URL
        // carries the API key, so it is dropped from the error text.
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                PipelineError::extraction(format!("Model API request failed: {}", e.without_url()))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::extraction(format!(
                "Model API request failed: {}",
                status
            )));
        }

        let payload: serde_json::Value = response.json().await.map_err(|e| {
            PipelineError::extraction(format!(
                "Model API returned invalid payload: {}",
                e.without_url()
            ))
        })?;

        // Aggregate token counts pass through; the per-token breakdown does not.
        let usage = match payload.get("usageMetadata").and_then(|v| v.as_object()) {
            Some(metadata) => {
                let mut usage = metadata.clone();
                usage.remove("promptTokensDetails");
                usage
            }
            None => serde_json::Map::new(),
        };

        let raw_text = payload["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .unwrap_or("");

        let recovered = self.recover_json_payload(raw_text);
        let record: serde_json::Value = serde_json::from_str(&recovered).map_err(|e| {
            tracing::warn!("Model returned unparseable output: {}", e);
            PipelineError::extraction(format!("Malformed model output: {}", e))
        })?;

        Ok(Extraction { record, usage })
    }
}
