//! Tick-driven quoting strategy.
//!
//! Ties the refresh scheduler to the quote engine:
//! - On a due tick, withdraw working orders and reprice
//! - Budget-check the proposals (all or none) and submit them
//! - Schedule the next refresh from the tick time
//!
//! Lookup failures abort the cycle before anything is submitted and
//! leave the due time unchanged, so the next tick retries.

use pmm_core::Size;
use tracing::{debug, info, warn};

use crate::config::QuoteConfig;
use crate::connector::{Connector, FillEvent};
use crate::error::{StrategyError, StrategyResult};
use crate::inventory::InventoryState;
use crate::quote_engine::{QuoteEngine, QuoteOutcome, SkipReason};
use crate::scheduler::{EnginePhase, EngineState, RefreshScheduler};

/// What a tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not due yet.
    Idle,
    /// A gate rejected quoting this cycle.
    Skipped(SkipReason),
    /// The budget check could not fund the proposal set.
    Unfunded { requested: usize },
    /// Proposals were handed to the order service.
    Quoted { submitted: usize },
}

/// Periodic two-sided quoting on a single pair.
#[derive(Debug)]
pub struct PmmStrategy {
    exchange: String,
    engine: QuoteEngine,
    scheduler: RefreshScheduler,
    state: EngineState,
}

impl PmmStrategy {
    pub fn new(exchange: impl Into<String>, config: QuoteConfig) -> StrategyResult<Self> {
        config.validate()?;
        Ok(Self {
            exchange: exchange.into(),
            scheduler: RefreshScheduler::new(config.refresh_interval_ms()),
            engine: QuoteEngine::new(config),
            state: EngineState::new(),
        })
    }

    pub fn config(&self) -> &QuoteConfig {
        self.engine.config()
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    /// Process one clock tick.
    pub fn on_tick<C: Connector>(
        &mut self,
        connector: &mut C,
        now_ms: u64,
    ) -> StrategyResult<TickOutcome> {
        if !self.scheduler.is_due(&self.state, now_ms) {
            return Ok(TickOutcome::Idle);
        }

        connector.cancel_all();
        self.state.phase = EnginePhase::Idle;

        match self.run_cycle(connector) {
            Ok(outcome) => {
                self.scheduler.schedule_next(&mut self.state, now_ms);
                debug!(
                    phase = %self.state.phase,
                    next_due_ms = self.state.next_due_ms,
                    "Quote cycle complete"
                );
                Ok(outcome)
            }
            Err(e) => {
                self.state.phase = EnginePhase::Idle;
                Err(e)
            }
        }
    }

    /// Log a fill reported by the connector.
    pub fn on_fill(&self, fill: &FillEvent) {
        info!(
            exchange = %self.exchange,
            side = %fill.side,
            amount = %fill.amount.inner().round_dp(2),
            market = %fill.trading_pair,
            price = %fill.price.inner().round_dp(2),
            "{} {} {} {} at {}",
            fill.side,
            fill.amount.inner().round_dp(2),
            fill.trading_pair,
            self.exchange,
            fill.price.inner().round_dp(2),
        );
    }

    fn run_cycle<C: Connector>(&mut self, connector: &mut C) -> StrategyResult<TickOutcome> {
        let inventory = self.read_inventory(connector)?;
        let pair = self.engine.config().trading_pair.clone();
        let window = connector.price_window(&pair)?;

        self.state.phase = EnginePhase::Evaluating;
        let proposals = match self.engine.compute(&mut self.state, &inventory, &window) {
            QuoteOutcome::Skip(reason) => {
                self.state.phase = EnginePhase::Idle;
                return Ok(TickOutcome::Skipped(reason));
            }
            QuoteOutcome::Quote {
                proposals,
                snapshot,
            } => {
                info!(
                    market = %pair,
                    trend = %snapshot.trend,
                    ratio = %snapshot.inventory_ratio.round_dp(4),
                    spread = %snapshot.spread,
                    buy = %snapshot.buy_price,
                    sell = %snapshot.sell_price,
                    "Quotes generated"
                );
                proposals
            }
        };

        let requested = proposals.len();
        let funded = connector.adjust_for_budget(proposals, true);
        if funded.is_empty() {
            info!(market = %pair, requested, "Insufficient balance for quotes, skipping");
            self.state.phase = EnginePhase::Idle;
            return Ok(TickOutcome::Unfunded { requested });
        }

        let mut submitted = 0;
        for proposal in &funded {
            match connector.submit(proposal) {
                Ok(cloid) => {
                    submitted += 1;
                    debug!(
                        cloid = %cloid,
                        side = %proposal.side,
                        price = %proposal.price,
                        amount = %proposal.amount,
                        "Order submitted"
                    );
                }
                Err(e) => {
                    warn!(side = %proposal.side, price = %proposal.price, error = %e, "Order submission failed");
                }
            }
        }

        self.state.phase = if submitted > 0 {
            EnginePhase::Quoting
        } else {
            EnginePhase::Idle
        };
        Ok(TickOutcome::Quoted { submitted })
    }

    fn read_inventory<C: Connector>(&self, connector: &C) -> StrategyResult<InventoryState> {
        let config = self.engine.config();
        let pair = &config.trading_pair;

        let base = connector.balance(pair.base())?;
        let quote = connector.balance(pair.quote())?;
        let reference = connector.reference_price(pair, config.price_type)?;
        if !reference.is_positive() {
            return Err(StrategyError::PriceUnavailable {
                pair: pair.to_string(),
                reason: format!("non-positive {} price {reference}", config.price_type),
            });
        }

        Ok(InventoryState::new(Size::new(base), quote, reference))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::{AccountService, MarketDataFeed, OrderService};
    use crate::quote_engine::OrderProposal;
    use crate::trend::Trend;
    use mockall::mock;
    use pmm_core::{ClientOrderId, OrderSide, Price, PriceType, PriceWindow, TradingPair};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    mock! {
        pub Venue {}

        impl MarketDataFeed for Venue {
            fn price_window(&self, pair: &TradingPair) -> StrategyResult<PriceWindow>;
        }

        impl AccountService for Venue {
            fn balance(&self, asset: &str) -> StrategyResult<Decimal>;
            fn reference_price(&self, pair: &TradingPair, price_type: PriceType) -> StrategyResult<Price>;
        }

        impl OrderService for Venue {
            fn cancel_all(&mut self);
            fn submit(&mut self, proposal: &OrderProposal) -> StrategyResult<ClientOrderId>;
            fn adjust_for_budget(&self, proposals: Vec<OrderProposal>, all_or_none: bool) -> Vec<OrderProposal>;
        }
    }

    fn strategy() -> PmmStrategy {
        PmmStrategy::new("binance_paper_trade", QuoteConfig::default()).unwrap()
    }

    /// Venue at reference 100 holding `base` ETH and `quote` USDT.
    fn venue(base: Decimal, quote: Decimal) -> MockVenue {
        let mut venue = MockVenue::new();
        venue.expect_balance().returning(move |asset| match asset {
            "ETH" => Ok(base),
            "USDT" => Ok(quote),
            other => panic!("unexpected asset {other}"),
        });
        venue
            .expect_reference_price()
            .returning(|_, _| Ok(Price::new(dec!(100))));
        venue
            .expect_price_window()
            .returning(|_| Ok(PriceWindow::from_closes(&[dec!(100); 30]).unwrap()));
        venue
    }

    #[test]
    fn test_due_tick_cancels_and_quotes() {
        let mut venue = venue(dec!(5), dec!(500));
        venue.expect_cancel_all().times(1).return_const(());
        venue
            .expect_adjust_for_budget()
            .times(1)
            .withf(|proposals, all_or_none| proposals.len() == 2 && *all_or_none)
            .returning(|proposals, _| proposals);
        venue
            .expect_submit()
            .times(2)
            .withf(|p| match p.side {
                OrderSide::Buy => p.price.inner() == dec!(99.9),
                OrderSide::Sell => p.price.inner() == dec!(100.1),
            })
            .returning(|_| Ok(ClientOrderId::new()));

        let mut strategy = strategy();
        let outcome = strategy.on_tick(&mut venue, 0).unwrap();

        assert_eq!(outcome, TickOutcome::Quoted { submitted: 2 });
        assert_eq!(strategy.state().next_due_ms, 15_000);
        assert_eq!(strategy.state().phase, EnginePhase::Quoting);
        assert_eq!(strategy.state().last_trend, Some(Trend::Sideways));
        assert_eq!(strategy.state().previous_spread_multiplier, Some(dec!(0.001)));
    }

    #[test]
    fn test_refresh_cadence() {
        let mut venue = venue(dec!(5), dec!(500));
        venue.expect_cancel_all().times(2).return_const(());
        venue
            .expect_adjust_for_budget()
            .times(2)
            .returning(|proposals, _| proposals);
        venue
            .expect_submit()
            .times(4)
            .returning(|_| Ok(ClientOrderId::new()));

        let mut strategy = strategy();
        assert!(matches!(
            strategy.on_tick(&mut venue, 0).unwrap(),
            TickOutcome::Quoted { .. }
        ));
        for t in [1_000, 7_500, 14_999] {
            assert_eq!(strategy.on_tick(&mut venue, t).unwrap(), TickOutcome::Idle);
        }
        assert_eq!(strategy.state().phase, EnginePhase::Quoting);

        assert!(matches!(
            strategy.on_tick(&mut venue, 15_000).unwrap(),
            TickOutcome::Quoted { .. }
        ));
        assert_eq!(strategy.state().next_due_ms, 30_000);
    }

    #[test]
    fn test_exposure_rejection_still_withdraws_and_reschedules() {
        // ratio 0.92
        let mut venue = venue(dec!(9.2), dec!(80));
        venue.expect_cancel_all().times(1).return_const(());
        venue.expect_adjust_for_budget().never();
        venue.expect_submit().never();

        let mut strategy = strategy();
        let outcome = strategy.on_tick(&mut venue, 0).unwrap();

        assert!(matches!(
            outcome,
            TickOutcome::Skipped(SkipReason::ExposureLimit { .. })
        ));
        assert_eq!(strategy.state().phase, EnginePhase::Idle);
        assert_eq!(strategy.state().next_due_ms, 15_000);
        assert_eq!(strategy.state().previous_spread_multiplier, None);
    }

    #[test]
    fn test_balance_failure_propagates_and_retries_next_tick() {
        let mut venue = MockVenue::new();
        venue.expect_cancel_all().times(1).return_const(());
        venue.expect_balance().returning(|asset| {
            Err(StrategyError::BalanceUnavailable {
                asset: asset.to_string(),
                reason: "timeout".to_string(),
            })
        });
        venue.expect_submit().never();

        let mut strategy = strategy();
        let err = strategy.on_tick(&mut venue, 5_000).unwrap_err();

        assert!(matches!(err, StrategyError::BalanceUnavailable { .. }));
        assert_eq!(strategy.state().next_due_ms, 0);
        assert_eq!(strategy.state().phase, EnginePhase::Idle);
        assert_eq!(strategy.state().previous_spread_multiplier, None);
    }

    #[test]
    fn test_zero_reference_price_is_lookup_failure() {
        let mut venue = MockVenue::new();
        venue.expect_cancel_all().return_const(());
        venue.expect_balance().returning(|_| Ok(dec!(10)));
        venue
            .expect_reference_price()
            .returning(|_, _| Ok(Price::ZERO));
        venue.expect_submit().never();

        let mut strategy = strategy();
        let err = strategy.on_tick(&mut venue, 0).unwrap_err();
        assert!(matches!(err, StrategyError::PriceUnavailable { .. }));
    }

    #[test]
    fn test_unfunded_proposals_not_submitted() {
        let mut venue = venue(dec!(5), dec!(500));
        venue.expect_cancel_all().return_const(());
        venue
            .expect_adjust_for_budget()
            .returning(|_, _| Vec::new());
        venue.expect_submit().never();

        let mut strategy = strategy();
        let outcome = strategy.on_tick(&mut venue, 0).unwrap();

        assert_eq!(outcome, TickOutcome::Unfunded { requested: 2 });
        assert_eq!(strategy.state().phase, EnginePhase::Idle);
        assert_eq!(strategy.state().next_due_ms, 15_000);
    }

    #[test]
    fn test_submit_failure_does_not_abort_other_side() {
        let mut venue = venue(dec!(5), dec!(500));
        venue.expect_cancel_all().return_const(());
        venue
            .expect_adjust_for_budget()
            .returning(|proposals, _| proposals);
        venue.expect_submit().times(2).returning(|p| match p.side {
            OrderSide::Buy => Err(StrategyError::OrderRejected("post-only would cross".into())),
            OrderSide::Sell => Ok(ClientOrderId::new()),
        });

        let mut strategy = strategy();
        let outcome = strategy.on_tick(&mut venue, 0).unwrap();
        assert_eq!(outcome, TickOutcome::Quoted { submitted: 1 });
        assert_eq!(strategy.state().phase, EnginePhase::Quoting);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = QuoteConfig {
            order_refresh_time_secs: 0,
            ..Default::default()
        };
        assert!(matches!(
            PmmStrategy::new("paper", config),
            Err(StrategyError::Core(_))
        ));
    }

    #[test]
    fn test_on_fill_does_not_panic() {
        let strategy = strategy();
        strategy.on_fill(&FillEvent {
            trading_pair: TradingPair::new("ETH", "USDT"),
            side: OrderSide::Sell,
            price: Price::new(dec!(100.1)),
            amount: Size::new(dec!(0.05)),
            timestamp_ms: 0,
        });
    }
}
