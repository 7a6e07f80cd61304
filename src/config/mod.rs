//! Configuration module for barforge.
//!
//! Settings come either from environment variables (grouped by concern into
//! aggregation and logging sub-configs) or from a TOML file with the same
//! field names.

mod aggregation_config;
mod logging_config;

pub use aggregation_config::AggregationEnvConfig;
pub use logging_config::LoggingEnvConfig;

use crate::application::market_data::pipeline::PipelineConfig;
use crate::application::market_data::window::WindowSpec;
use crate::domain::market::interval::Interval;
use crate::domain::market::rolling_buffer::DEFAULT_BUFFER_SIZE;
use crate::domain::market::symbol::extract_vt_symbol;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub symbols: Vec<String>,
    /// Window size; 0 disables window bars
    pub window: u32,
    pub window_interval: Interval,
    pub buffer_size: usize,
    pub session_filter: bool,
    pub log_dir: Option<PathBuf>,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        let logging = LoggingEnvConfig::default();
        Self {
            symbols: Vec::new(),
            window: 0,
            window_interval: Interval::Minute,
            buffer_size: DEFAULT_BUFFER_SIZE,
            session_filter: false,
            log_dir: logging.log_dir,
            log_level: logging.log_level,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(&|key: &str| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(get: &dyn Fn(&str) -> Option<String>) -> Result<Self> {
        let aggregation =
            AggregationEnvConfig::from_lookup(get).context("Failed to load aggregation config")?;
        let logging = LoggingEnvConfig::from_lookup(get);

        Ok(Self {
            symbols: aggregation.symbols,
            window: aggregation.window,
            window_interval: aggregation.window_interval,
            buffer_size: aggregation.buffer_size,
            session_filter: aggregation.session_filter,
            log_dir: logging.log_dir,
            log_level: logging.log_level,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML config")
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&content).context(format!("Invalid config file {}", path.display()))
    }

    /// Rejects settings that would fail later at engine construction
    pub fn validate(&self) -> Result<()> {
        if self.buffer_size == 0 {
            anyhow::bail!("buffer_size must be at least 1");
        }
        self.window_spec()?;
        for vt_symbol in &self.symbols {
            extract_vt_symbol(vt_symbol).context("Invalid entry in symbols")?;
        }
        Ok(())
    }

    pub fn window_spec(&self) -> Result<Option<WindowSpec>> {
        if self.window == 0 {
            return Ok(None);
        }
        let spec = WindowSpec::new(self.window, self.window_interval)
            .context("Invalid window settings")?;
        Ok(Some(spec))
    }

    pub fn pipeline_config(&self) -> Result<PipelineConfig> {
        self.validate()?;
        Ok(PipelineConfig {
            window: self.window_spec()?,
            buffer_size: self.buffer_size,
            session_filter: self.session_filter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_validate() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        let pipeline = config.pipeline_config().unwrap();
        assert!(pipeline.window.is_none());
        assert_eq!(pipeline.buffer_size, 100);
    }

    #[test]
    fn test_zero_buffer_rejected() {
        let config = Config {
            buffer_size: 0,
            ..Config::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("buffer_size"));
    }

    #[test]
    fn test_daily_window_rejected() {
        let config = Config {
            window: 1,
            window_interval: Interval::Daily,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_symbol_rejected() {
        let config = Config {
            symbols: vec!["rb2105".to_string()],
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_toml() {
        let config = Config::from_toml_str(
            r#"
            symbols = ["rb2105.SHFE"]
            window = 15
            window_interval = "1m"
            session_filter = true
            "#,
        )
        .unwrap();
        assert_eq!(config.symbols, vec!["rb2105.SHFE"]);
        assert_eq!(config.buffer_size, 100);
        assert_eq!(config.log_level, "info");
        let spec = config.window_spec().unwrap().unwrap();
        assert_eq!(spec.window(), 15);
        assert_eq!(spec.interval(), Interval::Minute);
    }

    #[test]
    fn test_from_lookup() {
        let config = Config::from_lookup(&|key: &str| match key {
            "BARFORGE_WINDOW" => Some("1".to_string()),
            "BARFORGE_WINDOW_INTERVAL" => Some("h".to_string()),
            "BARFORGE_LOG_LEVEL" => Some("debug".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.window_spec().unwrap(), Some(WindowSpec::hours(1).unwrap()));
        assert_eq!(config.log_level, "debug");
    }
}
