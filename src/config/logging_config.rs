//! Logging settings parsed from environment variables.

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct LoggingEnvConfig {
    /// Directory for per-strategy log files; stdout only when unset
    pub log_dir: Option<PathBuf>,
    pub log_level: String,
}

impl Default for LoggingEnvConfig {
    fn default() -> Self {
        Self {
            log_dir: None,
            log_level: "info".to_string(),
        }
    }
}

impl LoggingEnvConfig {
    pub fn from_lookup(get: &dyn Fn(&str) -> Option<String>) -> Self {
        Self {
            log_dir: get("BARFORGE_LOG_DIR")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            log_level: get("BARFORGE_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        }
    }
}
