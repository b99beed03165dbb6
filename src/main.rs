//! ADHD Insight - analysis backend for cognitive test batteries
//!
//! An HTTP service that aggregates reaction time, attention, memory,
//! Stroop and time-perception results, and asks a Gemini model to turn
//! them into a quick analysis or a structured screening report.
//!
//! Exit codes:
//!   0 - Clean shutdown
//!   1 - Startup error (invalid arguments, config, bind failure, etc.)

mod analysis;
mod cli;
mod client;
mod config;
mod models;
mod prompt;
mod server;
mod upload;

use anyhow::{Context, Result};
use cli::Args;
use client::{AnalysisClient, GeminiClient};
use config::{Config, CONFIG_FILE_NAME};
use server::AppState;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;
use upload::UploadStore;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args)?;

    info!("ADHD Insight v{}", env!("CARGO_PKG_VERSION"));
    debug!(
        "Arguments: bind={:?} model={:?} upload_dir={:?} timeout={:?}",
        args.bind, args.model, args.upload_dir, args.timeout
    );

    if let Err(e) = run(args).await {
        error!("Startup failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .adhd-insight.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to customize the bind address, model, and upload directory.");
    println!("   The API key is read from GEMINI_API_KEY, never from this file.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) -> Result<()> {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

/// Build the client and serve until shutdown.
async fn run(args: Args) -> Result<()> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let client = GeminiClient::new(config.gemini_config(), args.api_key.clone())
        .context("Failed to build the Gemini client")?;

    if !client.is_configured() {
        warn!("GEMINI_API_KEY not found. Analysis endpoints will return errors.");
    }

    if args.list_models {
        return handle_list_models(&client).await;
    }

    let uploads = UploadStore::new(config.server.upload_dir.clone());
    uploads.ensure_dir().with_context(|| {
        format!(
            "Failed to create upload directory {}",
            uploads.dir().display()
        )
    })?;

    info!("Model: {}", client.model_name());
    info!("Upload directory: {}", uploads.dir().display());
    info!("Timeout: {}s", config.model.timeout_seconds);

    let state = AppState::new(Arc::new(client), uploads, config.server.max_upload_bytes);

    server::serve(&config.server.bind_address, state).await
}

/// Handle --list-models: print every model that can generate content.
async fn handle_list_models(client: &GeminiClient) -> Result<()> {
    let models = client
        .list_models()
        .await
        .context("Failed to list available models")?;

    let usable: Vec<_> = models
        .iter()
        .filter(|model| model.supports_generate_content())
        .collect();

    if usable.is_empty() {
        println!("No models supporting generateContent were found.");
        return Ok(());
    }

    println!("Models supporting generateContent:\n");
    for model in &usable {
        if model.display_name.is_empty() {
            println!("  {}", model.name);
        } else {
            println!("  {} ({})", model.name, model.display_name);
        }
        if !model.description.is_empty() {
            println!("      {}", model.description);
        }
    }
    println!("\nTotal: {} models", usable.len());

    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}
