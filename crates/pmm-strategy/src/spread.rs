//! Volatility-driven spread with exponential smoothing.
//!
//! The smoother holds no state of its own; the previous smoothed
//! value lives in `EngineState` and is passed in each cycle.

use rust_decimal::Decimal;

use crate::config::QuoteConfig;

#[derive(Debug, Clone, Copy)]
pub struct SpreadSmoother {
    alpha: Decimal,
    min_spread: Decimal,
    max_spread: Decimal,
    volatility_factor: Decimal,
}

impl SpreadSmoother {
    pub fn from_config(config: &QuoteConfig) -> Self {
        Self {
            alpha: config.smoothing_alpha,
            min_spread: config.min_spread,
            max_spread: config.max_spread,
            volatility_factor: config.volatility_spread_factor,
        }
    }

    /// `clamp(volatility * factor, min_spread, max_spread)`.
    pub fn raw_spread(&self, volatility: Decimal) -> Decimal {
        volatility
            .saturating_mul(self.volatility_factor)
            .min(self.max_spread)
            .max(self.min_spread)
    }

    /// Blend `raw` into `previous`; the first sample seeds the average.
    pub fn smooth(&self, raw: Decimal, previous: Option<Decimal>) -> Decimal {
        match previous {
            None => raw,
            Some(prev) => self.alpha * raw + (Decimal::ONE - self.alpha) * prev,
        }
    }
}

impl Default for SpreadSmoother {
    fn default() -> Self {
        Self::from_config(&QuoteConfig::default())
    }
}
