//! Collaborator interfaces the strategy calls through.
//!
//! Implementations own exchange connectivity, balances and order
//! state. All calls are synchronous; each tick works on snapshots
//! taken at call time.

use pmm_core::{ClientOrderId, OrderSide, Price, PriceType, PriceWindow, Size, TradingPair};
use rust_decimal::Decimal;

use crate::error::StrategyResult;
use crate::quote_engine::OrderProposal;

/// Source of recent close prices.
pub trait MarketDataFeed {
    /// Closes for `pair`, possibly shorter than requested during warm-up.
    fn price_window(&self, pair: &TradingPair) -> StrategyResult<PriceWindow>;
}

/// Balances and reference prices.
pub trait AccountService {
    fn balance(&self, asset: &str) -> StrategyResult<Decimal>;

    fn reference_price(&self, pair: &TradingPair, price_type: PriceType) -> StrategyResult<Price>;
}

/// Order placement and withdrawal.
pub trait OrderService {
    /// Withdraw every working order. Best effort.
    fn cancel_all(&mut self);

    fn submit(&mut self, proposal: &OrderProposal) -> StrategyResult<ClientOrderId>;

    /// Drop proposals that cannot be funded. With `all_or_none`,
    /// returns either every proposal or none.
    fn adjust_for_budget(
        &self,
        proposals: Vec<OrderProposal>,
        all_or_none: bool,
    ) -> Vec<OrderProposal>;
}

/// Everything the strategy needs from a venue.
pub trait Connector: MarketDataFeed + AccountService + OrderService {}

impl<T: MarketDataFeed + AccountService + OrderService> Connector for T {}

/// A fill reported by the connector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillEvent {
    pub trading_pair: TradingPair,
    pub side: OrderSide,
    pub price: Price,
    pub amount: Size,
    pub timestamp_ms: u64,
}
