//! Regime pricing and price clipping.
//!
//! Sideways markets mean-revert around the reference price with the
//! smoothed spread and inventory skew. Trending markets chase momentum
//! with fixed asymmetric multipliers and ignore spread and skew.

use pmm_core::Price;
use rust_decimal::Decimal;

use crate::config::QuoteConfig;
use crate::trend::Trend;

/// Pricing formula selected by the detected trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PricingRegime {
    /// `ref * (1 ∓ spread + skew)`.
    Sideways { spread: Decimal, skew: Decimal },
    /// Fixed multipliers leaning toward accumulating base.
    Uptrend,
    /// Fixed multipliers leaning toward shedding base.
    Downtrend,
}

impl PricingRegime {
    pub fn select(trend: Trend, spread: Decimal, skew: Decimal) -> Self {
        match trend {
            Trend::Uptrend => Self::Uptrend,
            Trend::Downtrend => Self::Downtrend,
            Trend::Sideways => Self::Sideways { spread, skew },
        }
    }

    /// Unclipped `(buy, sell)` prices; `None` if either overflows.
    pub fn quote(&self, reference: Price, config: &QuoteConfig) -> Option<(Price, Price)> {
        let (buy_factor, sell_factor) = match *self {
            Self::Uptrend => (config.uptrend_buy_multiplier, config.uptrend_sell_multiplier),
            Self::Downtrend => (
                config.downtrend_buy_multiplier,
                config.downtrend_sell_multiplier,
            ),
            Self::Sideways { spread, skew } => (
                Decimal::ONE.checked_sub(spread)?.checked_add(skew)?,
                Decimal::ONE.checked_add(spread)?.checked_add(skew)?,
            ),
        };
        Some((scale(reference, buy_factor)?, scale(reference, sell_factor)?))
    }
}

fn scale(reference: Price, factor: Decimal) -> Option<Price> {
    reference.inner().checked_mul(factor).map(Price::new)
}

/// Bounds quotes to `[ref * (1 - limit), ref * (1 + limit)]`.
#[derive(Debug, Clone, Copy)]
pub struct PriceClipper {
    clip_limit: Decimal,
}

impl PriceClipper {
    pub fn new(clip_limit: Decimal) -> Self {
        Self { clip_limit }
    }

    /// Lower and upper bound around `reference`.
    pub fn band(&self, reference: Price) -> Option<(Price, Price)> {
        Some((
            scale(reference, Decimal::ONE.checked_sub(self.clip_limit)?)?,
            scale(reference, Decimal::ONE.checked_add(self.clip_limit)?)?,
        ))
    }

    pub fn clip(&self, price: Price, reference: Price) -> Option<Price> {
        let (low, high) = self.band(reference)?;
        Some(price.min(high).max(low))
    }
}

impl Default for PriceClipper {
    fn default() -> Self {
        Self::new(Decimal::new(3, 2))
    }
}
