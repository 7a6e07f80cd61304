//! Bar aggregation settings parsed from environment variables.

use crate::domain::market::interval::Interval;
use crate::domain::market::rolling_buffer::DEFAULT_BUFFER_SIZE;
use anyhow::{Context, Result};
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct AggregationEnvConfig {
    pub symbols: Vec<String>,
    pub window: u32,
    pub window_interval: Interval,
    pub buffer_size: usize,
    pub session_filter: bool,
}

impl AggregationEnvConfig {
    pub fn from_lookup(get: &dyn Fn(&str) -> Option<String>) -> Result<Self> {
        let symbols = get("BARFORGE_SYMBOLS")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let window = match get("BARFORGE_WINDOW") {
            Some(v) => v
                .trim()
                .parse::<u32>()
                .context(format!("Invalid BARFORGE_WINDOW: {}", v))?,
            None => 0,
        };

        let window_interval = match get("BARFORGE_WINDOW_INTERVAL") {
            Some(v) => Interval::from_str(v.trim())
                .context("Failed to parse BARFORGE_WINDOW_INTERVAL")?,
            None => Interval::Minute,
        };

        let buffer_size = match get("BARFORGE_BUFFER_SIZE") {
            Some(v) => v
                .trim()
                .parse::<usize>()
                .context(format!("Invalid BARFORGE_BUFFER_SIZE: {}", v))?,
            None => DEFAULT_BUFFER_SIZE,
        };

        let session_filter = get("BARFORGE_SESSION_FILTER")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(false);

        Ok(Self {
            symbols,
            window,
            window_interval,
            buffer_size,
            session_filter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AggregationEnvConfig::from_lookup(&lookup(&[])).unwrap();
        assert!(config.symbols.is_empty());
        assert_eq!(config.window, 0);
        assert_eq!(config.window_interval, Interval::Minute);
        assert_eq!(config.buffer_size, 100);
        assert!(!config.session_filter);
    }

    #[test]
    fn test_parses_values() {
        let config = AggregationEnvConfig::from_lookup(&lookup(&[
            ("BARFORGE_SYMBOLS", "rb2105.SHFE, cu2105.SHFE,,"),
            ("BARFORGE_WINDOW", "2"),
            ("BARFORGE_WINDOW_INTERVAL", "1h"),
            ("BARFORGE_BUFFER_SIZE", "30"),
            ("BARFORGE_SESSION_FILTER", "true"),
        ]))
        .unwrap();
        assert_eq!(config.symbols, vec!["rb2105.SHFE", "cu2105.SHFE"]);
        assert_eq!(config.window, 2);
        assert_eq!(config.window_interval, Interval::Hour);
        assert_eq!(config.buffer_size, 30);
        assert!(config.session_filter);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(
            AggregationEnvConfig::from_lookup(&lookup(&[("BARFORGE_WINDOW", "five")])).is_err()
        );
        assert!(
            AggregationEnvConfig::from_lookup(&lookup(&[("BARFORGE_WINDOW_INTERVAL", "week")]))
                .is_err()
        );
    }
}
