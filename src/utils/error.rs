use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("No image files supplied")]
    NoFilesError,

    #[error("OCR failed: {message}")]
    OcrError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid configuration value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Structured extraction failed: {message}")]
    ExtractionError { message: String },

    #[error("Usage limit exceeded for '{id}'")]
    RateLimitExceeded { id: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Task join error: {0}")]
    JoinError(#[from] tokio::task::JoinError),
}

impl PipelineError {
    pub fn ocr(message: impl Into<String>) -> Self {
        PipelineError::OcrError {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        PipelineError::ConfigError {
            message: message.into(),
        }
    }

    pub fn extraction(message: impl Into<String>) -> Self {
        PipelineError::ExtractionError {
            message: message.into(),
        }
    }

    /// Message safe to show to an end user. Provider/internal detail stays in
    /// the logs; only the error kind crosses the pipeline boundary.
    pub fn user_friendly_message(&self) -> String {
        match self {
            PipelineError::NoFilesError => "No files uploaded".to_string(),
            PipelineError::RateLimitExceeded { .. } => "Too many requests".to_string(),
            PipelineError::ConfigError { .. } | PipelineError::InvalidConfigValueError { .. } => {
                "Service is misconfigured".to_string()
            }
            _ => "Failed to process receipt".to_string(),
        }
    }

    /// Exit code for the CLI: 2 for caller mistakes, 3 for configuration
    /// problems, 1 for processing failures.
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::NoFilesError | PipelineError::RateLimitExceeded { .. } => 2,
            PipelineError::ConfigError { .. } | PipelineError::InvalidConfigValueError { .. } => 3,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
