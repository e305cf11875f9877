pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::memory_store::MemoryCounterStore;
pub use adapters::OcrEngine;
pub use config::Settings;
pub use core::pipeline::ReceiptPipeline;
pub use core::rate_limit::{UsageDecision, UsageLimiter, DEMO_USAGE_ID};
pub use domain::model::{Extraction, ImageBuffer, OcrMode, ReceiptRecord};
pub use utils::error::{PipelineError, Result};
