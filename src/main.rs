use clap::Parser;
use receipt_etl::adapters::gemini::GeminiClient;
use receipt_etl::utils::{logger, validation::Validate};
use receipt_etl::{
    CliConfig, ImageBuffer, MemoryCounterStore, OcrEngine, ReceiptPipeline, Settings, UsageLimiter,
    DEMO_USAGE_ID,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting receipt-etl");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }

    let settings = Settings::from_env();
    if let Err(e) = settings.validate() {
        tracing::error!("Environment validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }

    // Demo gate: check-and-record happens once, before any OCR work. A
    // denied request costs nothing downstream. The CLI's limiter is
    // process-local; a deployment would back it with a shared store.
    if config.demo {
        let limiter = UsageLimiter::new(MemoryCounterStore::new());
        match limiter.check_and_record(DEMO_USAGE_ID).await {
            Ok(decision) if decision.is_allowed() => {
                tracing::debug!("Demo usage recorded for '{}'", DEMO_USAGE_ID);
            }
            Ok(_) => {
                let e = receipt_etl::PipelineError::RateLimitExceeded {
                    id: DEMO_USAGE_ID.to_string(),
                };
                tracing::warn!("{}", e);
                eprintln!("❌ {}", e.user_friendly_message());
                std::process::exit(e.exit_code());
            }
            Err(e) => {
                tracing::error!("Usage check failed: {}", e);
                eprintln!("❌ {}", e.user_friendly_message());
                std::process::exit(e.exit_code());
            }
        }
    }

    let mut images = Vec::with_capacity(config.images.len());
    for path in &config.images {
        let bytes = tokio::fs::read(path).await?;
        let mime_type =
            receipt_etl::domain::model::mime_type_for_path(path).unwrap_or("image/jpeg");
        tracing::debug!("Loaded {} ({} bytes, {})", path.display(), bytes.len(), mime_type);
        images.push(ImageBuffer::new(bytes, mime_type));
    }

    let result = build_and_run(&config, settings, images).await;

    match result {
        Ok(()) => {
            tracing::info!("✅ Receipt processed successfully");
        }
        Err(e) => {
            tracing::error!("❌ Receipt processing failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(e.exit_code());
        }
    }

    Ok(())
}

async fn build_and_run(
    config: &CliConfig,
    settings: Settings,
    images: Vec<ImageBuffer>,
) -> receipt_etl::Result<()> {
    let ocr = OcrEngine::for_mode(
        config.mode,
        settings.ocr_space_api_key,
        settings.ocr_space_endpoint,
    )?;
    let extractor = GeminiClient::new(settings.gemini_api_key, settings.gemini_model)?;
    let pipeline = ReceiptPipeline::new(ocr, extractor);

    tracing::info!(
        "Processing {} image(s) in {} mode",
        images.len(),
        config.mode
    );
    let extraction = pipeline.process_images(images).await?;

    println!("{}", serde_json::to_string_pretty(&extraction.record)?);
    if config.show_usage {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::Value::Object(extraction.usage))?
        );
    }

    Ok(())
}
