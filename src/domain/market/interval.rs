use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Bar interval kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1m")]
    Minute,
    #[serde(rename = "1h")]
    Hour,
    #[serde(rename = "d")]
    Daily,
    #[serde(rename = "tick")]
    Tick,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Minute => "1m",
            Interval::Hour => "1h",
            Interval::Daily => "d",
            Interval::Tick => "tick",
        }
    }

    /// Whether window bars can be built on top of this interval
    pub fn supports_window(&self) -> bool {
        matches!(self, Interval::Minute | Interval::Hour)
    }
}

impl FromStr for Interval {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "1m" | "m" | "minute" => Ok(Interval::Minute),
            "1h" | "h" | "hour" => Ok(Interval::Hour),
            "d" | "1d" | "daily" => Ok(Interval::Daily),
            "tick" => Ok(Interval::Tick),
            _ => Err(anyhow!(
                "Invalid interval: '{}'. Valid options: 1m, 1h, d, tick",
                s
            )),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
