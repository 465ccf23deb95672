//! In-process paper venue.
//!
//! Generates a deterministic price path (drift line plus a sine
//! oscillation), keeps balances and resting orders, and fills a
//! resting order once the path trades through its price.

use crate::config::PaperConfig;
use crate::error::AppResult;
use pmm_core::{
    ClientOrderId, OrderSide, Price, PriceSample, PriceType, PriceWindow, Size, TradingPair,
};
use pmm_strategy::{
    AccountService, FillEvent, MarketDataFeed, OrderProposal, OrderService, StrategyError,
    StrategyResult,
};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::{debug, trace, warn};

const PRICE_DP: u32 = 2;

#[derive(Debug, Clone)]
struct RestingOrder {
    cloid: ClientOrderId,
    proposal: OrderProposal,
}

/// Paper-trading connector for a single pair.
#[derive(Debug)]
pub struct PaperConnector {
    config: PaperConfig,
    pair: TradingPair,
    balances: HashMap<String, Decimal>,
    window: PriceWindow,
    tick: u64,
    mid: Price,
    last_trade: Option<Price>,
    open_orders: Vec<RestingOrder>,
}

impl PaperConnector {
    /// Create a venue with `warmup_samples` closes at the start price,
    /// spaced `sample_interval_ms` apart and ending at `start_ms`.
    pub fn new(
        config: PaperConfig,
        pair: TradingPair,
        window_len: usize,
        start_ms: u64,
    ) -> AppResult<Self> {
        let mut window = PriceWindow::new(window_len);
        for i in (0..config.warmup_samples as u64).rev() {
            let ts = start_ms.saturating_sub(i.saturating_mul(config.sample_interval_ms));
            window.push(PriceSample::new(ts, config.start_price))?;
        }

        let mut balances = HashMap::new();
        balances.insert(pair.base().to_string(), config.base_balance);
        balances.insert(pair.quote().to_string(), config.quote_balance);

        Ok(Self {
            mid: config.start_price,
            config,
            pair,
            balances,
            window,
            tick: 0,
            last_trade: None,
            open_orders: Vec::new(),
        })
    }

    pub fn mid_price(&self) -> Price {
        self.mid
    }

    pub fn open_order_count(&self) -> usize {
        self.open_orders.len()
    }

    pub fn balance_of(&self, asset: &str) -> Decimal {
        self.balances.get(asset).copied().unwrap_or(Decimal::ZERO)
    }

    /// Step the price path to the next tick and match resting orders.
    pub fn advance(&mut self, now_ms: u64) -> AppResult<Vec<FillEvent>> {
        let tick = self.tick + 1;
        let mid = self.price_at(tick);
        self.window.push(PriceSample::new(now_ms, mid))?;
        self.tick = tick;
        self.mid = mid;
        trace!(tick, mid = %mid, "Paper price advanced");

        let (crossed, resting): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.open_orders)
                .into_iter()
                .partition(|o| match o.proposal.side {
                    OrderSide::Buy => mid <= o.proposal.price,
                    OrderSide::Sell => mid >= o.proposal.price,
                });
        self.open_orders = resting;

        let mut fills = Vec::with_capacity(crossed.len());
        for order in crossed {
            let p = &order.proposal;
            let Some(notional) = p.notional() else {
                warn!(cloid = %order.cloid, "Paper order notional overflows, dropping");
                continue;
            };
            let base = self.pair.base().to_string();
            let quote = self.pair.quote().to_string();
            match p.side {
                OrderSide::Buy => {
                    *self.balances.entry(base).or_default() += p.amount.inner();
                    *self.balances.entry(quote).or_default() -= notional;
                }
                OrderSide::Sell => {
                    *self.balances.entry(base).or_default() -= p.amount.inner();
                    *self.balances.entry(quote).or_default() += notional;
                }
            }
            self.last_trade = Some(p.price);
            debug!(cloid = %order.cloid, side = %p.side, price = %p.price, "Paper order filled");

            fills.push(FillEvent {
                trading_pair: p.trading_pair.clone(),
                side: p.side,
                price: p.price,
                amount: p.amount,
                timestamp_ms: now_ms,
            });
        }
        Ok(fills)
    }

    /// Price on the synthetic path at `tick`.
    fn price_at(&self, tick: u64) -> Price {
        let start = self.config.start_price.inner().to_f64().unwrap_or(0.0);
        let drift = self.config.drift_per_tick.to_f64().unwrap_or(0.0);
        let amplitude = self.config.amplitude.to_f64().unwrap_or(0.0);
        let phase = std::f64::consts::TAU * tick as f64 / self.config.period_ticks as f64;

        let value = start * (1.0 + drift * tick as f64) * (1.0 + amplitude * phase.sin());
        Decimal::from_f64(value)
            .map(|d| d.round_dp(PRICE_DP))
            .filter(|d| d.is_sign_positive() && !d.is_zero())
            .map(Price::new)
            .unwrap_or(self.mid)
    }

    fn check_pair(&self, pair: &TradingPair) -> bool {
        *pair == self.pair
    }

    /// Quote and base required to fund `proposals`; `None` on overflow.
    fn requirements<'a>(
        mut proposals: impl Iterator<Item = &'a OrderProposal>,
    ) -> Option<(Decimal, Decimal)> {
        proposals.try_fold((Decimal::ZERO, Decimal::ZERO), |(quote, base), p| match p.side {
            OrderSide::Buy => Some((quote.checked_add(p.notional()?)?, base)),
            OrderSide::Sell => Some((quote, base.checked_add(p.amount.inner())?)),
        })
    }
}

impl MarketDataFeed for PaperConnector {
    fn price_window(&self, pair: &TradingPair) -> StrategyResult<PriceWindow> {
        if !self.check_pair(pair) {
            return Err(StrategyError::FeedUnavailable {
                pair: pair.to_string(),
                reason: format!("paper venue only serves {}", self.pair),
            });
        }
        Ok(self.window.clone())
    }
}

impl AccountService for PaperConnector {
    fn balance(&self, asset: &str) -> StrategyResult<Decimal> {
        Ok(self.balance_of(asset))
    }

    fn reference_price(&self, pair: &TradingPair, price_type: PriceType) -> StrategyResult<Price> {
        if !self.check_pair(pair) {
            return Err(StrategyError::PriceUnavailable {
                pair: pair.to_string(),
                reason: format!("paper venue only serves {}", self.pair),
            });
        }
        Ok(match price_type {
            PriceType::MidPrice => self.mid,
            PriceType::LastTrade => self.last_trade.unwrap_or(self.mid),
        })
    }
}

impl OrderService for PaperConnector {
    fn cancel_all(&mut self) {
        if !self.open_orders.is_empty() {
            debug!(count = self.open_orders.len(), "Cancelling paper orders");
        }
        self.open_orders.clear();
    }

    fn submit(&mut self, proposal: &OrderProposal) -> StrategyResult<ClientOrderId> {
        if !self.check_pair(&proposal.trading_pair) {
            return Err(StrategyError::OrderRejected(format!(
                "unknown market {}",
                proposal.trading_pair
            )));
        }
        if !proposal.price.is_positive() || !proposal.amount.is_positive() {
            return Err(StrategyError::OrderRejected(format!(
                "non-positive price {} or amount {}",
                proposal.price, proposal.amount
            )));
        }

        let cloid = ClientOrderId::new();
        self.open_orders.push(RestingOrder {
            cloid: cloid.clone(),
            proposal: proposal.clone(),
        });
        Ok(cloid)
    }

    fn adjust_for_budget(
        &self,
        proposals: Vec<OrderProposal>,
        all_or_none: bool,
    ) -> Vec<OrderProposal> {
        let quote_available = self.balance_of(self.pair.quote());
        let base_available = self.balance_of(self.pair.base());

        if all_or_none {
            return match Self::requirements(proposals.iter()) {
                Some((quote, base)) if quote <= quote_available && base <= base_available => {
                    proposals
                }
                _ => Vec::new(),
            };
        }

        let mut quote_left = quote_available;
        let mut base_left = base_available;
        proposals
            .into_iter()
            .filter(|p| match (p.side, p.notional()) {
                (OrderSide::Buy, Some(notional)) if notional <= quote_left => {
                    quote_left -= notional;
                    true
                }
                (OrderSide::Sell, _) if p.amount.inner() <= base_left => {
                    base_left -= p.amount.inner();
                    true
                }
                _ => false,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn pair() -> TradingPair {
        TradingPair::new("ETH", "USDT")
    }

    fn flat_config() -> PaperConfig {
        PaperConfig {
            start_price: Price::new(dec!(100)),
            amplitude: Decimal::ZERO,
            base_balance: dec!(5),
            quote_balance: dec!(500),
            ..Default::default()
        }
    }

    fn proposal(side: OrderSide, price: Decimal) -> OrderProposal {
        OrderProposal::limit_maker(pair(), side, Price::new(price), Size::new(dec!(1)))
    }

    #[test]
    fn test_warmup_fills_window() {
        let venue = PaperConnector::new(flat_config(), pair(), 1000, 100_000).unwrap();
        let window = venue.price_window(&pair()).unwrap();
        assert_eq!(window.len(), 30);
        assert_eq!(window.last().unwrap().timestamp_ms, 100_000);
    }

    #[test]
    fn test_warmup_before_epoch_saturates() {
        let venue = PaperConnector::new(flat_config(), pair(), 1000, 5).unwrap();
        assert_eq!(venue.price_window(&pair()).unwrap().len(), 30);
    }

    #[test]
    fn test_wrong_pair_is_unavailable() {
        let venue = PaperConnector::new(flat_config(), pair(), 1000, 0).unwrap();
        let btc = TradingPair::new("BTC", "USDT");
        assert!(matches!(
            venue.price_window(&btc),
            Err(StrategyError::FeedUnavailable { .. })
        ));
        assert!(matches!(
            venue.reference_price(&btc, PriceType::MidPrice),
            Err(StrategyError::PriceUnavailable { .. })
        ));
    }

    #[test]
    fn test_unknown_asset_balance_is_zero() {
        let venue = PaperConnector::new(flat_config(), pair(), 1000, 0).unwrap();
        assert_eq!(venue.balance("BTC").unwrap(), Decimal::ZERO);
        assert_eq!(venue.balance("ETH").unwrap(), dec!(5));
    }

    #[test]
    fn test_price_path_oscillates() {
        let config = PaperConfig {
            start_price: Price::new(dec!(100)),
            amplitude: dec!(0.01),
            period_ticks: 4,
            ..Default::default()
        };
        let mut venue = PaperConnector::new(config, pair(), 1000, 0).unwrap();

        venue.advance(1_000).unwrap();
        assert_eq!(venue.mid_price().inner(), dec!(101));
        venue.advance(2_000).unwrap();
        assert_eq!(venue.mid_price().inner(), dec!(100));
        venue.advance(3_000).unwrap();
        assert_eq!(venue.mid_price().inner(), dec!(99));
    }

    #[test]
    fn test_drift_moves_price() {
        let config = PaperConfig {
            start_price: Price::new(dec!(100)),
            amplitude: Decimal::ZERO,
            drift_per_tick: dec!(0.01),
            ..Default::default()
        };
        let mut venue = PaperConnector::new(config, pair(), 1000, 0).unwrap();
        venue.advance(1_000).unwrap();
        venue.advance(2_000).unwrap();
        assert_eq!(venue.mid_price().inner(), dec!(102));
    }

    #[test]
    fn test_crossed_orders_fill_and_move_balances() {
        let mut venue = PaperConnector::new(flat_config(), pair(), 1000, 0).unwrap();
        venue.submit(&proposal(OrderSide::Buy, dec!(100))).unwrap();
        venue.submit(&proposal(OrderSide::Sell, dec!(101))).unwrap();

        let fills = venue.advance(1_000).unwrap();

        assert_eq!(fills.len(), 1);
        assert_eq!(fills[0].side, OrderSide::Buy);
        assert_eq!(fills[0].timestamp_ms, 1_000);
        assert_eq!(venue.balance_of("ETH"), dec!(6));
        assert_eq!(venue.balance_of("USDT"), dec!(400));
        assert_eq!(venue.open_order_count(), 1);
        assert_eq!(
            venue.reference_price(&pair(), PriceType::LastTrade).unwrap(),
            Price::new(dec!(100))
        );
    }

    #[test]
    fn test_last_trade_falls_back_to_mid() {
        let venue = PaperConnector::new(flat_config(), pair(), 1000, 0).unwrap();
        assert_eq!(
            venue.reference_price(&pair(), PriceType::LastTrade).unwrap(),
            venue.mid_price()
        );
    }

    #[test]
    fn test_cancel_all_clears_book() {
        let mut venue = PaperConnector::new(flat_config(), pair(), 1000, 0).unwrap();
        venue.submit(&proposal(OrderSide::Buy, dec!(90))).unwrap();
        venue.cancel_all();
        assert_eq!(venue.open_order_count(), 0);
        assert!(venue.advance(1_000).unwrap().is_empty());
    }

    #[test]
    fn test_submit_rejects_zero_amount() {
        let mut venue = PaperConnector::new(flat_config(), pair(), 1000, 0).unwrap();
        let zero = OrderProposal::limit_maker(
            pair(),
            OrderSide::Buy,
            Price::new(dec!(99)),
            Size::ZERO,
        );
        assert!(matches!(
            venue.submit(&zero),
            Err(StrategyError::OrderRejected(_))
        ));
    }

    #[test]
    fn test_budget_all_or_none() {
        let venue = PaperConnector::new(flat_config(), pair(), 1000, 0).unwrap();
        let affordable = vec![
            proposal(OrderSide::Buy, dec!(99)),
            proposal(OrderSide::Sell, dec!(101)),
        ];
        assert_eq!(venue.adjust_for_budget(affordable, true).len(), 2);

        // 6 × 99 = 594 USDT > 500
        let too_big = vec![
            OrderProposal::limit_maker(pair(), OrderSide::Buy, Price::new(dec!(99)), Size::new(dec!(6))),
            proposal(OrderSide::Sell, dec!(101)),
        ];
        assert!(venue.adjust_for_budget(too_big.clone(), true).is_empty());
        let partial = venue.adjust_for_budget(too_big, false);
        assert_eq!(partial.len(), 1);
        assert_eq!(partial[0].side, OrderSide::Sell);
    }

    #[test]
    fn test_rejected_sample_leaves_path_unchanged() {
        let mut venue = PaperConnector::new(flat_config(), pair(), 1000, 10_000).unwrap();
        let before = venue.price_window(&pair()).unwrap().len();

        assert!(venue.advance(5_000).is_err());

        assert_eq!(venue.price_window(&pair()).unwrap().len(), before);
        assert_eq!(venue.tick, 0);
        assert_eq!(venue.mid_price(), Price::new(dec!(100)));

        venue.advance(11_000).unwrap();
        assert_eq!(venue.tick, 1);
    }

    #[test]
    fn test_budget_rejects_overflowing_notional() {
        let venue = PaperConnector::new(flat_config(), pair(), 1000, 0).unwrap();
        let huge = vec![OrderProposal::limit_maker(
            pair(),
            OrderSide::Buy,
            Price::new(Decimal::MAX),
            Size::new(dec!(2)),
        )];
        assert!(venue.adjust_for_budget(huge.clone(), true).is_empty());
        assert!(venue.adjust_for_budget(huge, false).is_empty());
    }
}
