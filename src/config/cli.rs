use crate::domain::model::{mime_type_for_path, OcrMode};
use crate::utils::error::{PipelineError, Result};
use crate::utils::validation::Validate;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "receipt-etl")]
#[command(about = "Extract an itemized record from photographed receipt images")]
pub struct CliConfig {
    /// Receipt image files, in page order
    pub images: Vec<PathBuf>,

    /// OCR backend: 'local' (in-process tesseract) or 'hosted' (OCR.space)
    #[arg(long, default_value = "hosted")]
    pub mode: OcrMode,

    /// Gate this run through the demo usage limiter. Counters are held
    /// in-memory, so limits only bite within one process; a deployment
    /// backs the limiter with a shared store
    #[arg(long)]
    pub demo: bool,

    /// Emit the usage metadata alongside the record
    #[arg(long)]
    pub show_usage: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        for path in &self.images {
            if mime_type_for_path(path).is_none() {
                return Err(PipelineError::InvalidConfigValueError {
                    field: "images".to_string(),
                    value: path.display().to_string(),
                    reason: "Not a recognized image file extension".to_string(),
                });
            }
        }

        Ok(())
    }
}
