//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.adhd-insight.toml` files. The API key is never stored here; it
//! comes from the environment or the command line.

use crate::client::GeminiConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".adhd-insight.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Model settings.
    #[serde(default)]
    pub model: ModelConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to listen on.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Directory for transient audio uploads. Created at startup.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,

    /// Largest accepted audio upload in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            upload_dir: default_upload_dir(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_max_upload_bytes() -> usize {
    25 * 1024 * 1024 // 25MB
}

/// Remote model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Gemini model name.
    #[serde(default = "default_model")]
    pub name: String,

    /// Base URL of the Generative Language API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Temperature for generation.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model(),
            api_base_url: default_api_base_url(),
            temperature: default_temperature(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_api_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_temperature() -> f32 {
    0.4
}

fn default_timeout() -> u64 {
    120
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// Only values given explicitly on the command line (or via their
    /// environment variables) override the file.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref bind) = args.bind {
            self.server.bind_address = bind.clone();
        }
        if let Some(ref dir) = args.upload_dir {
            self.server.upload_dir = dir.clone();
        }
        if let Some(ref model) = args.model {
            self.model.name = model.clone();
        }
        if let Some(ref url) = args.api_base_url {
            self.model.api_base_url = url.clone();
        }
        if let Some(timeout) = args.timeout {
            self.model.timeout_seconds = timeout;
        }
    }

    /// Client settings derived from the model section.
    pub fn gemini_config(&self) -> GeminiConfig {
        GeminiConfig {
            api_base_url: self.model.api_base_url.clone(),
            model_name: self.model.name.clone(),
            temperature: self.model.temperature,
            timeout_seconds: self.model.timeout_seconds,
            ..GeminiConfig::default()
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::tests::make_args;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.model.name, "gemini-1.5-flash");
        assert_eq!(config.server.bind_address, "127.0.0.1:5000");
        assert_eq!(config.server.upload_dir, PathBuf::from("uploads"));
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[server]
bind_address = "0.0.0.0:8080"
upload_dir = "/tmp/insight"

[model]
name = "gemini-1.5-pro"
temperature = 0.2
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.server.bind_address, "0.0.0.0:8080");
        assert_eq!(config.server.upload_dir, PathBuf::from("/tmp/insight"));
        assert_eq!(config.server.max_upload_bytes, 25 * 1024 * 1024);
        assert_eq!(config.model.name, "gemini-1.5-pro");
        assert_eq!(config.model.temperature, 0.2);
        assert_eq!(config.model.timeout_seconds, 120);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[model]\ntimeout_seconds = 15\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.model.timeout_seconds, 15);

        std::fs::write(&path, "[model\nbroken").unwrap();
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_merge_only_overrides_given_values() {
        let mut config: Config = toml::from_str("[model]\nname = \"from-file\"\n").unwrap();

        let mut args = make_args();
        config.merge_with_args(&args);
        assert_eq!(config.model.name, "from-file");

        args.model = Some("from-cli".to_string());
        args.bind = Some("0.0.0.0:9000".to_string());
        args.timeout = Some(30);
        config.merge_with_args(&args);
        assert_eq!(config.model.name, "from-cli");
        assert_eq!(config.server.bind_address, "0.0.0.0:9000");
        assert_eq!(config.gemini_config().timeout_seconds, 30);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[server]"));
        assert!(toml_str.contains("[model]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.model.name, "gemini-1.5-flash");
    }
}
