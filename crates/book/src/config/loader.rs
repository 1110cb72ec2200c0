use std::path::Path;
use thiserror::Error;

use super::types::BookConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Load book configuration from a JSON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<BookConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Load configuration from a JSON string
pub fn load_config_from_str(json: &str) -> Result<BookConfig, ConfigError> {
    let config: BookConfig = serde_json::from_str(json)?;
    config.validate()?;
    Ok(config)
}

/// Load the default embedded configuration
pub fn load_default_config() -> Result<BookConfig, ConfigError> {
    let default_config = include_str!("book_config.json");
    load_config_from_str(default_config)
}

impl BookConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.product_id.trim().is_empty() {
            return Err(ConfigError::Invalid("product_id is empty".to_string()));
        }
        if !(self.feed_url.starts_with("ws://") || self.feed_url.starts_with("wss://")) {
            return Err(ConfigError::Invalid(format!(
                "feed_url must be a ws:// or wss:// URL, got {:?}",
                self.feed_url
            )));
        }
        if self.channel.trim().is_empty() {
            return Err(ConfigError::Invalid("channel is empty".to_string()));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("poll_interval_ms must be > 0".to_string()));
        }
        if self.queue_capacity == Some(0) {
            return Err(ConfigError::Invalid("queue_capacity must be > 0".to_string()));
        }
        if self.event_capacity == 0 {
            return Err(ConfigError::Invalid("event_capacity must be > 0".to_string()));
        }
        Ok(())
    }
}
