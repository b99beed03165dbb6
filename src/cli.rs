//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation. Values left unset fall back to the
//! configuration file and then to built-in defaults.

use clap::Parser;
use std::path::PathBuf;

/// ADHD Insight - analysis backend for cognitive test batteries
///
/// Serves the quick analysis, speech analysis, and final report
/// endpoints. Scores are aggregated locally; the narrative text is
/// written by a Gemini model.
///
/// Examples:
///   adhd-insight
///   adhd-insight --bind 0.0.0.0:8080 --model gemini-1.5-pro
///   adhd-insight --list-models
///   adhd-insight --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to configuration file
    ///
    /// If not specified, looks for .adhd-insight.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Address to listen on (default: 127.0.0.1:5000)
    #[arg(short, long, value_name = "ADDR", env = "ADHD_INSIGHT_BIND")]
    pub bind: Option<String>,

    /// Gemini model used for analysis (default: gemini-1.5-flash)
    #[arg(short, long, env = "GEMINI_MODEL")]
    pub model: Option<String>,

    /// Base URL of the Generative Language API
    #[arg(long, value_name = "URL")]
    pub api_base_url: Option<String>,

    /// Directory for transient audio uploads (default: uploads)
    #[arg(long, value_name = "DIR")]
    pub upload_dir: Option<PathBuf>,

    /// Request timeout in seconds for model calls
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Gemini API key
    ///
    /// Usually read from GEMINI_API_KEY or a .env file.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .adhd-insight.toml configuration file
    #[arg(long, conflicts_with = "list_models")]
    pub init_config: bool,

    /// Print the models that support content generation and exit
    #[arg(long)]
    pub list_models: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref bind) = self.bind {
            if bind.parse::<std::net::SocketAddr>().is_err() {
                return Err(format!("Invalid bind address: {}", bind));
            }
        }

        if let Some(ref url) = self.api_base_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("API base URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(ref model) = self.model {
            if model.trim().is_empty() {
                return Err("Model name cannot be empty".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
