use crate::domain::errors::SymbolError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Trading venue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Exchange {
    Shfe,
    Dce,
    Czce,
    Cffex,
    Ine,
    Sse,
    Szse,
    Local,
}

impl Exchange {
    pub fn code(&self) -> &'static str {
        match self {
            Exchange::Shfe => "SHFE",
            Exchange::Dce => "DCE",
            Exchange::Czce => "CZCE",
            Exchange::Cffex => "CFFEX",
            Exchange::Ine => "INE",
            Exchange::Sse => "SSE",
            Exchange::Szse => "SZSE",
            Exchange::Local => "LOCAL",
        }
    }
}

impl FromStr for Exchange {
    type Err = SymbolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SHFE" => Ok(Exchange::Shfe),
            "DCE" => Ok(Exchange::Dce),
            "CZCE" => Ok(Exchange::Czce),
            "CFFEX" => Ok(Exchange::Cffex),
            "INE" => Ok(Exchange::Ine),
            "SSE" => Ok(Exchange::Sse),
            "SZSE" => Ok(Exchange::Szse),
            "LOCAL" => Ok(Exchange::Local),
            _ => Err(SymbolError::UnknownExchange {
                code: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Splits `"rb2105.SHFE"` into `("rb2105", Exchange::Shfe)`.
pub fn extract_vt_symbol(vt_symbol: &str) -> Result<(String, Exchange), SymbolError> {
    let (symbol, code) = vt_symbol
        .rsplit_once('.')
        .filter(|(symbol, _)| !symbol.is_empty())
        .ok_or_else(|| SymbolError::Malformed {
            vt_symbol: vt_symbol.to_string(),
        })?;
    Ok((symbol.to_string(), code.parse()?))
}

pub fn generate_vt_symbol(symbol: &str, exchange: Exchange) -> String {
    format!("{}.{}", symbol, exchange)
}

/// Maps a six-digit A-share code to its vt_symbol.
pub fn equity_vt_symbol(code: &str) -> Option<String> {
    let exchange = match code.chars().next()? {
        '6' | '5' => Exchange::Sse,
        '0' | '3' | '1' => Exchange::Szse,
        _ => return None,
    };
    Some(generate_vt_symbol(code, exchange))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_vt_symbol() {
        let (symbol, exchange) = extract_vt_symbol("rb2105.SHFE").unwrap();
        assert_eq!(symbol, "rb2105");
        assert_eq!(exchange, Exchange::Shfe);
    }

    #[test]
    fn test_extract_vt_symbol_errors() {
        assert_eq!(
            extract_vt_symbol("rb2105"),
            Err(SymbolError::Malformed {
                vt_symbol: "rb2105".to_string()
            })
        );
        assert_eq!(
            extract_vt_symbol("rb2105.NYSE"),
            Err(SymbolError::UnknownExchange {
                code: "NYSE".to_string()
            })
        );
        assert!(extract_vt_symbol(".SHFE").is_err());
    }

    #[test]
    fn test_generate_roundtrip() {
        let vt = generate_vt_symbol("IF2106", Exchange::Cffex);
        assert_eq!(vt, "IF2106.CFFEX");
        assert_eq!(extract_vt_symbol(&vt).unwrap().1, Exchange::Cffex);
    }

    #[test]
    fn test_equity_vt_symbol() {
        assert_eq!(equity_vt_symbol("600000").as_deref(), Some("600000.SSE"));
        assert_eq!(equity_vt_symbol("510300").as_deref(), Some("510300.SSE"));
        assert_eq!(equity_vt_symbol("000001").as_deref(), Some("000001.SZSE"));
        assert_eq!(equity_vt_symbol("300750").as_deref(), Some("300750.SZSE"));
        assert_eq!(equity_vt_symbol("830799"), None);
        assert_eq!(equity_vt_symbol(""), None);
    }
}
