use crate::utils::error::PipelineError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One uploaded receipt image. Owned by the pipeline for the duration of a
/// single request, never persisted.
#[derive(Debug, Clone)]
pub struct ImageBuffer {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl ImageBuffer {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }
}

/// MIME type for an image file extension. Upload layers hand us a declared
/// type; the CLI has to infer one from the filename.
pub fn mime_type_for_path(path: &std::path::Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        "tif" | "tiff" => Some("image/tiff"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

/// Which OCR backend to run a batch through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrMode {
    Local,
    Hosted,
}

impl FromStr for OcrMode {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Ok(OcrMode::Local),
            "hosted" => Ok(OcrMode::Hosted),
            other => Err(PipelineError::InvalidConfigValueError {
                field: "mode".to_string(),
                value: other.to_string(),
                reason: "Expected 'local' or 'hosted'".to_string(),
            }),
        }
    }
}

impl std::fmt::Display for OcrMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OcrMode::Local => write!(f, "local"),
            OcrMode::Hosted => write!(f, "hosted"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReceiptItem {
    pub name: String,
    pub price: f64,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Coupon {
    pub applied_to: String,
    pub amount: f64,
    pub description: String,
}

/// Normalized receipt, as promised by the model contract. The pipeline itself
/// hands back the raw JSON value it parsed; this typed view is for callers
/// that want the schema enforced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReceiptRecord {
    pub date_time: String,
    #[serde(default)]
    pub items: Vec<ReceiptItem>,
    #[serde(default)]
    pub coupons: Vec<Coupon>,
    pub tax: f64,
    pub tips: f64,
    pub subtotal: f64,
    pub total: f64,
    pub payment_method: String,
}

/// What the structured-extraction step returns: the receipt JSON as the model
/// produced it, plus the provider's aggregate token accounting.
#[derive(Debug, Clone, Serialize)]
pub struct Extraction {
    pub record: serde_json::Value,
    pub usage: serde_json::Map<String, serde_json::Value>,
}

impl Extraction {
    /// Deserialize the raw record into the typed schema. Shape mismatches are
    /// the caller's concern, surfaced here as a serde error.
    pub fn typed_record(&self) -> serde_json::Result<ReceiptRecord> {
        serde_json::from_value(self.record.clone())
    }
}

/// Per-identifier usage counters backing the demo rate limiter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageCounter {
    pub daily_count: u32,
    pub hourly_count: u32,
    pub last_request_time: DateTime<Utc>,
}

impl Default for UsageCounter {
    fn default() -> Self {
        Self {
            daily_count: 0,
            hourly_count: 0,
            last_request_time: DateTime::<Utc>::UNIX_EPOCH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ocr_mode_parses_case_insensitively() {
        assert_eq!("local".parse::<OcrMode>().unwrap(), OcrMode::Local);
        assert_eq!("Hosted".parse::<OcrMode>().unwrap(), OcrMode::Hosted);
        assert!("offline".parse::<OcrMode>().is_err());
    }

    #[test]
    fn test_mime_type_for_path_covers_common_image_formats() {
        use std::path::Path;

        assert_eq!(
            mime_type_for_path(Path::new("receipt.JPG")),
            Some("image/jpeg")
        );
        assert_eq!(
            mime_type_for_path(Path::new("scan.png")),
            Some("image/png")
        );
        assert_eq!(mime_type_for_path(Path::new("notes.txt")), None);
        assert_eq!(mime_type_for_path(Path::new("no_extension")), None);
    }

    #[test]
    fn test_usage_counter_default_is_epoch_zero() {
        let counter = UsageCounter::default();
        assert_eq!(counter.daily_count, 0);
        assert_eq!(counter.hourly_count, 0);
        assert_eq!(counter.last_request_time, DateTime::<Utc>::UNIX_EPOCH);
    }

    #[test]
    fn test_typed_record_from_model_json() {
        let extraction = Extraction {
            record: serde_json::json!({
                "date_time": "2017-07-28T02:39:48",
                "items": [{"name": "PET TOY", "price": 1.97, "quantity": 1}],
                "coupons": [],
                "tax": 4.59, "tips": 0.0, "subtotal": 93.62, "total": 98.21,
                "payment_method": "VISA Debit"
            }),
            usage: serde_json::Map::new(),
        };

        let record = extraction.typed_record().unwrap();
        assert_eq!(record.items.len(), 1);
        assert_eq!(record.items[0].quantity, 1);
        assert_eq!(record.payment_method, "VISA Debit");
    }

    #[test]
    fn test_typed_record_rejects_wrong_shape() {
        let extraction = Extraction {
            record: serde_json::json!({"totally": "unrelated"}),
            usage: serde_json::Map::new(),
        };

        assert!(extraction.typed_record().is_err());
    }
}
