use crate::domain::model::{Extraction, ImageBuffer, UsageCounter};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// One OCR backend: image bytes in, plain text out. Implementations must not
/// keep engine state alive between calls.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, image: &ImageBuffer) -> Result<String>;
}

/// Turns merged OCR text into a normalized receipt via a generative model.
#[async_trait]
pub trait StructuredExtractor: Send + Sync {
    async fn extract_structured(&self, text: &str) -> Result<Extraction>;
}

/// External key-value store holding usage counters. Persistence and expiry
/// policy (e.g. the daily reset) belong to the store, not to this crate.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Counter for `id`, or the zero/epoch default when absent.
    async fn get(&self, id: &str) -> Result<UsageCounter>;

    /// Increment both counters and stamp `now`, but only if the stored value
    /// still equals `expected` (absent counts as the default). Returns false
    /// when another writer got there first; the caller re-reads and retries.
    async fn increment_if_matches(
        &self,
        id: &str,
        expected: &UsageCounter,
        now: DateTime<Utc>,
    ) -> Result<bool>;
}
