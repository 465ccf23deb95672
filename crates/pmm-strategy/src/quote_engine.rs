//! Quote price calculation engine.
//!
//! One cycle turns an inventory snapshot and the close window into
//! either a buy/sell proposal pair or a skip:
//!
//! ```text
//! exposure gate → trend → target ratio → skew
//!               → volatility → raw spread → smoothed spread
//!               → regime prices → clip → imbalance filter → proposals
//! ```
//!
//! Every estimator fails closed, so a cycle always produces an outcome.

use std::fmt;

use pmm_core::{OrderSide, OrderType, Price, PriceWindow, Size, TradingPair};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::config::QuoteConfig;
use crate::inventory::{InventorySkewCalculator, InventoryState};
use crate::pricing::{PriceClipper, PricingRegime};
use crate::scheduler::EngineState;
use crate::spread::SpreadSmoother;
use crate::trend::{Trend, TrendClassifier};
use crate::volatility::VolatilityEstimator;

/// A candidate order, not yet funded or submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderProposal {
    pub trading_pair: TradingPair,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub price: Price,
    pub amount: Size,
    pub is_maker: bool,
}

impl OrderProposal {
    /// Resting limit order that adds liquidity.
    pub fn limit_maker(trading_pair: TradingPair, side: OrderSide, price: Price, amount: Size) -> Self {
        Self {
            trading_pair,
            side,
            order_type: OrderType::Limit,
            price,
            amount,
            is_maker: true,
        }
    }

    /// Quote-asset value of the order; `None` on overflow.
    pub fn notional(&self) -> Option<Decimal> {
        self.amount.notional(self.price)
    }
}

/// Why a cycle produced no proposals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Inventory ratio outside `[1 - limit, limit]`.
    ExposureLimit { ratio: Decimal, limit: Decimal },
    /// Inventory ratio outside `[low, high]` after pricing.
    InventoryImbalance {
        ratio: Decimal,
        low: Decimal,
        high: Decimal,
    },
    /// Inventory or quote prices do not fit in a `Decimal`.
    ValuationOverflow { stage: &'static str },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExposureLimit { ratio, limit } => {
                write!(f, "exposure too high (ratio {ratio}, limit {limit})")
            }
            Self::InventoryImbalance { ratio, low, high } => {
                write!(f, "inventory imbalance (ratio {ratio} outside [{low}, {high}])")
            }
            Self::ValuationOverflow { stage } => write!(f, "valuation overflow in {stage}"),
        }
    }
}

/// Intermediate values of a priced cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteSnapshot {
    pub reference_price: Price,
    pub inventory_ratio: Decimal,
    pub trend: Trend,
    pub target_ratio: Decimal,
    pub skew: Decimal,
    pub volatility: Decimal,
    pub raw_spread: Decimal,
    pub spread: Decimal,
    pub buy_price: Price,
    pub sell_price: Price,
}

/// Result of one engine cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuoteOutcome {
    Quote {
        proposals: Vec<OrderProposal>,
        snapshot: QuoteSnapshot,
    },
    Skip(SkipReason),
}

impl QuoteOutcome {
    pub fn proposals(&self) -> &[OrderProposal] {
        match self {
            Self::Quote { proposals, .. } => proposals,
            Self::Skip(_) => &[],
        }
    }

    pub fn skip_reason(&self) -> Option<&SkipReason> {
        match self {
            Self::Quote { .. } => None,
            Self::Skip(reason) => Some(reason),
        }
    }
}

/// Orchestrates estimators, skew, smoothing, clipping and gates.
#[derive(Debug, Clone)]
pub struct QuoteEngine {
    config: QuoteConfig,
    volatility: VolatilityEstimator,
    trend: TrendClassifier,
    skew: InventorySkewCalculator,
    smoother: SpreadSmoother,
    clipper: PriceClipper,
}

impl QuoteEngine {
    pub fn new(config: QuoteConfig) -> Self {
        Self {
            volatility: VolatilityEstimator::new(config.volatility_length),
            trend: TrendClassifier::new(config.trend_fast, config.trend_slow),
            skew: InventorySkewCalculator::from_config(&config),
            smoother: SpreadSmoother::from_config(&config),
            clipper: PriceClipper::new(config.clip_limit),
            config,
        }
    }

    pub fn config(&self) -> &QuoteConfig {
        &self.config
    }

    /// Run one quoting cycle.
    ///
    /// Updates `state.last_trend` and the smoothed spread once the
    /// exposure gate has passed; a cycle rejected by that gate leaves
    /// `state` untouched.
    pub fn compute(
        &self,
        state: &mut EngineState,
        inventory: &InventoryState,
        window: &PriceWindow,
    ) -> QuoteOutcome {
        let reference = inventory.reference_price;
        let Some(ratio) = inventory.inventory_ratio() else {
            return self.overflow("inventory ratio");
        };

        // Exposure gate
        let limit = self.config.exposure_limit;
        if ratio < Decimal::ONE - limit || ratio > limit {
            info!(
                market = %self.config.trading_pair,
                ratio = %ratio,
                limit = %limit,
                "Exposure too high, skipping order placement"
            );
            return QuoteOutcome::Skip(SkipReason::ExposureLimit { ratio, limit });
        }

        // Trend and target inventory
        let trend = self.trend.classify(window).value();
        state.last_trend = Some(trend);
        let target_ratio = self.skew.target_ratio(trend);
        let skew = self.skew.skew(ratio, target_ratio);

        // Volatility spread, smoothed across cycles
        let volatility = self.volatility.estimate(window).value();
        let raw_spread = self.smoother.raw_spread(volatility);
        let spread = self
            .smoother
            .smooth(raw_spread, state.previous_spread_multiplier);
        state.previous_spread_multiplier = Some(spread);

        let regime = PricingRegime::select(trend, spread, skew);
        let clipped = regime.quote(reference, &self.config).and_then(|(buy, sell)| {
            Some((
                self.clipper.clip(buy, reference)?,
                self.clipper.clip(sell, reference)?,
            ))
        });
        let Some((buy_price, sell_price)) = clipped else {
            return self.overflow("quote prices");
        };

        debug!(
            market = %self.config.trading_pair,
            reference = %reference,
            ratio = %ratio,
            trend = %trend,
            volatility = %volatility,
            spread = %spread,
            skew = %skew,
            buy = %buy_price,
            sell = %sell_price,
            "Quote prices computed"
        );

        // Imbalance filter
        let (low, high) = (self.config.imbalance_low, self.config.imbalance_high);
        if ratio < low || ratio > high {
            info!(
                market = %self.config.trading_pair,
                ratio = %ratio,
                low = %low,
                high = %high,
                "Inventory imbalance too high, skipping order placement"
            );
            return QuoteOutcome::Skip(SkipReason::InventoryImbalance { ratio, low, high });
        }

        let amount = self.config.order_amount;
        let pair = &self.config.trading_pair;
        let proposals = vec![
            OrderProposal::limit_maker(pair.clone(), OrderSide::Buy, buy_price, amount),
            OrderProposal::limit_maker(pair.clone(), OrderSide::Sell, sell_price, amount),
        ];

        QuoteOutcome::Quote {
            proposals,
            snapshot: QuoteSnapshot {
                reference_price: reference,
                inventory_ratio: ratio,
                trend,
                target_ratio,
                skew,
                volatility,
                raw_spread,
                spread,
                buy_price,
                sell_price,
            },
        }
    }

    fn overflow(&self, stage: &'static str) -> QuoteOutcome {
        warn!(
            market = %self.config.trading_pair,
            stage,
            "Valuation overflow, skipping order placement"
        );
        QuoteOutcome::Skip(SkipReason::ValuationOverflow { stage })
    }
}
