pub mod pipeline;
pub mod rate_limit;

pub use crate::domain::model::{Extraction, ImageBuffer, OcrMode, ReceiptRecord, UsageCounter};
pub use crate::domain::ports::{CounterStore, StructuredExtractor, TextExtractor};
pub use crate::utils::error::Result;
