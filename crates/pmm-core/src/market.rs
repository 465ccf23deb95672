//! Trading pair identification and reference price selection.
//!
//! Pairs are written `BASE-QUOTE` (e.g. "ETH-USDT"), the same
//! notation used by exchange connectors and configuration files.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// A spot trading pair split into base and quote assets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TradingPair {
    base: String,
    quote: String,
}

impl TradingPair {
    /// Create a pair from its two asset symbols.
    pub fn new(base: impl Into<String>, quote: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            quote: quote.into(),
        }
    }

    /// Base asset symbol (the asset being bought or sold).
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Quote asset symbol (the asset prices are denominated in).
    pub fn quote(&self) -> &str {
        &self.quote
    }
}

impl fmt::Display for TradingPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.base, self.quote)
    }
}

impl FromStr for TradingPair {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (base, quote) = s
            .split_once('-')
            .ok_or_else(|| CoreError::InvalidTradingPair(format!("missing '-' in {s:?}")))?;

        let base = base.trim();
        let quote = quote.trim();
        if base.is_empty() || quote.is_empty() || quote.contains('-') {
            return Err(CoreError::InvalidTradingPair(s.to_string()));
        }

        Ok(Self::new(base.to_uppercase(), quote.to_uppercase()))
    }
}

impl TryFrom<String> for TradingPair {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TradingPair> for String {
    fn from(pair: TradingPair) -> Self {
        pair.to_string()
    }
}

/// Which price is used as the quoting anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PriceType {
    /// Mid of best bid and best ask.
    #[default]
    #[serde(rename = "mid")]
    MidPrice,
    /// Last traded price.
    #[serde(rename = "last")]
    LastTrade,
}

impl fmt::Display for PriceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MidPrice => write!(f, "mid"),
            Self::LastTrade => write!(f, "last"),
        }
    }
}
