//! Quoting configuration.
//!
//! Every field has a serde default so a config file only needs to
//! name what it overrides. The config is immutable for the lifetime
//! of a run.

use pmm_core::{CoreError, PriceType, Size, TradingPair, DEFAULT_WINDOW_CAPACITY};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Quote engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteConfig {
    /// Pair to quote, e.g. "ETH-USDT".
    #[serde(default = "default_trading_pair")]
    pub trading_pair: TradingPair,

    /// Amount of base asset per order, both sides.
    #[serde(default = "default_order_amount")]
    pub order_amount: Size,

    /// Seconds between quote refreshes.
    #[serde(default = "default_order_refresh_time_secs")]
    pub order_refresh_time_secs: u64,

    /// Reference price source ("mid" or "last").
    #[serde(default)]
    pub price_type: PriceType,

    /// Closes requested from the market data feed.
    #[serde(default = "default_price_window_len")]
    pub price_window_len: usize,

    // --- Estimators ---
    /// Number of closes used for the volatility estimate.
    #[serde(default = "default_volatility_length")]
    pub volatility_length: usize,

    /// Fast moving-average length for trend detection.
    #[serde(default = "default_trend_fast")]
    pub trend_fast: usize,

    /// Slow moving-average length for trend detection.
    #[serde(default = "default_trend_slow")]
    pub trend_slow: usize,

    // --- Gates ---
    /// Quoting stops when the base ratio leaves `[1 - limit, limit]`.
    #[serde(default = "default_exposure_limit")]
    pub exposure_limit: Decimal,

    /// Lower bound of the post-pricing imbalance filter.
    #[serde(default = "default_imbalance_low")]
    pub imbalance_low: Decimal,

    /// Upper bound of the post-pricing imbalance filter.
    #[serde(default = "default_imbalance_high")]
    pub imbalance_high: Decimal,

    /// Maximum fractional deviation of a quote from the reference price.
    #[serde(default = "default_clip_limit")]
    pub clip_limit: Decimal,

    // --- Spread ---
    /// EMA weight on the newest raw spread.
    #[serde(default = "default_smoothing_alpha")]
    pub smoothing_alpha: Decimal,

    /// Raw spread floor.
    #[serde(default = "default_min_spread")]
    pub min_spread: Decimal,

    /// Raw spread cap.
    #[serde(default = "default_max_spread")]
    pub max_spread: Decimal,

    /// raw spread = volatility × this factor (before clamping).
    #[serde(default = "default_volatility_spread_factor")]
    pub volatility_spread_factor: Decimal,

    // --- Inventory skew ---
    /// skew = (inventory_ratio - target_ratio) × gain.
    #[serde(default = "default_skew_gain")]
    pub skew_gain: Decimal,

    /// Target base ratio when no trend is detected.
    #[serde(default = "default_target_ratio_default")]
    pub target_ratio_default: Decimal,

    /// Target base ratio in an uptrend.
    #[serde(default = "default_target_ratio_uptrend")]
    pub target_ratio_uptrend: Decimal,

    /// Target base ratio in a downtrend.
    #[serde(default = "default_target_ratio_downtrend")]
    pub target_ratio_downtrend: Decimal,

    // --- Trend pricing ---
    #[serde(default = "default_uptrend_buy_multiplier")]
    pub uptrend_buy_multiplier: Decimal,

    #[serde(default = "default_uptrend_sell_multiplier")]
    pub uptrend_sell_multiplier: Decimal,

    #[serde(default = "default_downtrend_buy_multiplier")]
    pub downtrend_buy_multiplier: Decimal,

    #[serde(default = "default_downtrend_sell_multiplier")]
    pub downtrend_sell_multiplier: Decimal,
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            trading_pair: default_trading_pair(),
            order_amount: default_order_amount(),
            order_refresh_time_secs: default_order_refresh_time_secs(),
            price_type: PriceType::default(),
            price_window_len: default_price_window_len(),
            volatility_length: default_volatility_length(),
            trend_fast: default_trend_fast(),
            trend_slow: default_trend_slow(),
            exposure_limit: default_exposure_limit(),
            imbalance_low: default_imbalance_low(),
            imbalance_high: default_imbalance_high(),
            clip_limit: default_clip_limit(),
            smoothing_alpha: default_smoothing_alpha(),
            min_spread: default_min_spread(),
            max_spread: default_max_spread(),
            volatility_spread_factor: default_volatility_spread_factor(),
            skew_gain: default_skew_gain(),
            target_ratio_default: default_target_ratio_default(),
            target_ratio_uptrend: default_target_ratio_uptrend(),
            target_ratio_downtrend: default_target_ratio_downtrend(),
            uptrend_buy_multiplier: default_uptrend_buy_multiplier(),
            uptrend_sell_multiplier: default_uptrend_sell_multiplier(),
            downtrend_buy_multiplier: default_downtrend_buy_multiplier(),
            downtrend_sell_multiplier: default_downtrend_sell_multiplier(),
        }
    }
}

impl QuoteConfig {
    /// Refresh interval in milliseconds.
    pub fn refresh_interval_ms(&self) -> u64 {
        self.order_refresh_time_secs.saturating_mul(1000)
    }

    /// Reject parameter combinations the engine cannot quote with.
    pub fn validate(&self) -> Result<(), CoreError> {
        let invalid = |msg: String| Err(CoreError::InvalidConfig(msg));

        if !self.order_amount.is_positive() {
            return invalid(format!("order_amount must be > 0, got {}", self.order_amount));
        }
        if self.order_refresh_time_secs == 0 {
            return invalid("order_refresh_time_secs must be > 0".to_string());
        }
        if self.trend_fast == 0 || self.trend_slow == 0 || self.volatility_length == 0 {
            return invalid("estimator lengths must be > 0".to_string());
        }
        let required = self.volatility_length.max(self.trend_slow).max(self.trend_fast);
        if self.price_window_len < required {
            return invalid(format!(
                "price_window_len {} is shorter than the longest estimator ({required})",
                self.price_window_len
            ));
        }
        if self.smoothing_alpha <= Decimal::ZERO || self.smoothing_alpha > Decimal::ONE {
            return invalid(format!(
                "smoothing_alpha must be in (0, 1], got {}",
                self.smoothing_alpha
            ));
        }
        if self.min_spread < Decimal::ZERO || self.min_spread > self.max_spread {
            return invalid(format!(
                "spread bounds must satisfy 0 <= min ({}) <= max ({})",
                self.min_spread, self.max_spread
            ));
        }
        if self.clip_limit <= Decimal::ZERO || self.clip_limit >= Decimal::ONE {
            return invalid(format!("clip_limit must be in (0, 1), got {}", self.clip_limit));
        }
        if self.exposure_limit < Decimal::new(5, 1) || self.exposure_limit > Decimal::ONE {
            return invalid(format!(
                "exposure_limit must be in [0.5, 1], got {}",
                self.exposure_limit
            ));
        }
        for target in [
            self.target_ratio_default,
            self.target_ratio_uptrend,
            self.target_ratio_downtrend,
        ] {
            if target < Decimal::ZERO || target > Decimal::ONE {
                return invalid(format!("target ratios must be in [0, 1], got {target}"));
            }
        }
        if self.imbalance_low >= self.imbalance_high {
            return invalid(format!(
                "imbalance_low ({}) must be below imbalance_high ({})",
                self.imbalance_low, self.imbalance_high
            ));
        }
        Ok(())
    }
}

fn default_trading_pair() -> TradingPair {
    TradingPair::new("ETH", "USDT")
}
fn default_order_amount() -> Size {
    Size::new(Decimal::new(5, 2)) // 0.05 base
}
fn default_order_refresh_time_secs() -> u64 {
    15
}
fn default_price_window_len() -> usize {
    DEFAULT_WINDOW_CAPACITY
}
fn default_volatility_length() -> usize {
    30
}
fn default_trend_fast() -> usize {
    5
}
fn default_trend_slow() -> usize {
    20
}
fn default_exposure_limit() -> Decimal {
    Decimal::new(90, 2) // 0.90
}
fn default_imbalance_low() -> Decimal {
    Decimal::new(15, 2) // 0.15
}
fn default_imbalance_high() -> Decimal {
    Decimal::new(85, 2) // 0.85
}
fn default_clip_limit() -> Decimal {
    Decimal::new(3, 2) // 3% max deviation from reference
}
fn default_smoothing_alpha() -> Decimal {
    Decimal::new(2, 1) // 0.2
}
fn default_min_spread() -> Decimal {
    Decimal::new(1, 3) // 10 bps
}
fn default_max_spread() -> Decimal {
    Decimal::new(1, 2) // 100 bps
}
fn default_volatility_spread_factor() -> Decimal {
    Decimal::new(5, 0)
}
fn default_skew_gain() -> Decimal {
    Decimal::new(2, 2) // 0.02
}
fn default_target_ratio_default() -> Decimal {
    Decimal::new(5, 1) // 0.5
}
fn default_target_ratio_uptrend() -> Decimal {
    Decimal::new(65, 2) // 0.65
}
fn default_target_ratio_downtrend() -> Decimal {
    Decimal::new(35, 2) // 0.35
}
fn default_uptrend_buy_multiplier() -> Decimal {
    Decimal::new(9995, 4) // 0.9995
}
fn default_uptrend_sell_multiplier() -> Decimal {
    Decimal::new(1002, 3) // 1.002
}
fn default_downtrend_buy_multiplier() -> Decimal {
    Decimal::new(998, 3) // 0.998
}
fn default_downtrend_sell_multiplier() -> Decimal {
    Decimal::new(10015, 4) // 1.0015
}
