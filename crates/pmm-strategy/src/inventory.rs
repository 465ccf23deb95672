//! Inventory composition and skew.
//!
//! The inventory ratio is the share of portfolio value held in the
//! base asset. Skew pushes quotes toward a regime-dependent target
//! ratio: 0.65 in an uptrend, 0.35 in a downtrend, 0.5 otherwise.

use pmm_core::{Price, Size};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::config::QuoteConfig;
use crate::trend::Trend;

/// Ratio reported when the portfolio has no value.
pub const NEUTRAL_INVENTORY_RATIO: Decimal = dec!(0.5);

/// Snapshot of holdings valued at the reference price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InventoryState {
    pub base_amount: Size,
    pub quote_amount: Decimal,
    pub reference_price: Price,
}

impl InventoryState {
    pub fn new(base_amount: Size, quote_amount: Decimal, reference_price: Price) -> Self {
        Self {
            base_amount,
            quote_amount,
            reference_price,
        }
    }

    /// Base holdings valued in the quote asset; `None` on overflow.
    pub fn base_value(&self) -> Option<Decimal> {
        self.base_amount.notional(self.reference_price)
    }

    pub fn total_value(&self) -> Option<Decimal> {
        self.base_value()?.checked_add(self.quote_amount)
    }

    /// Fraction of total value held in base; 0.5 for an empty portfolio.
    ///
    /// `None` when the valuation does not fit in a `Decimal`.
    pub fn inventory_ratio(&self) -> Option<Decimal> {
        let base = self.base_value()?;
        let total = base.checked_add(self.quote_amount)?;
        if total > Decimal::ZERO {
            base.checked_div(total)
        } else {
            Some(NEUTRAL_INVENTORY_RATIO)
        }
    }
}

/// Converts inventory ratio and trend into a price adjustment.
#[derive(Debug, Clone, Copy)]
pub struct InventorySkewCalculator {
    gain: Decimal,
    target_default: Decimal,
    target_uptrend: Decimal,
    target_downtrend: Decimal,
}

impl InventorySkewCalculator {
    pub fn from_config(config: &QuoteConfig) -> Self {
        Self {
            gain: config.skew_gain,
            target_default: config.target_ratio_default,
            target_uptrend: config.target_ratio_uptrend,
            target_downtrend: config.target_ratio_downtrend,
        }
    }

    /// Target base ratio for a regime.
    pub fn target_ratio(&self, trend: Trend) -> Decimal {
        match trend {
            Trend::Uptrend => self.target_uptrend,
            Trend::Downtrend => self.target_downtrend,
            Trend::Sideways => self.target_default,
        }
    }

    /// `(inventory_ratio - target_ratio) * gain`.
    ///
    /// Positive when holding more base than targeted; the sideways
    /// formula adds it to both sides, raising both quotes.
    pub fn skew(&self, inventory_ratio: Decimal, target_ratio: Decimal) -> Decimal {
        (inventory_ratio - target_ratio).saturating_mul(self.gain)
    }
}

impl Default for InventorySkewCalculator {
    fn default() -> Self {
        Self::from_config(&QuoteConfig::default())
    }
}
