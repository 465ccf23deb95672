//! Trend-aware pure market making strategy.
//!
//! Provides periodic two-sided quoting:
//! - Volatility and trend estimates from recent closes
//! - Inventory skew toward a regime-dependent target ratio
//! - Exponentially smoothed spread, clipped quotes, exposure gates
//! - Refresh cadence with withdraw-then-requote cycles
//!
//! # Architecture
//!
//! ```text
//! Clock tick → PmmStrategy.on_tick()
//!               ├─ RefreshScheduler: due?
//!               ├─ Connector: cancel_all, balances, reference price, closes
//!               ├─ QuoteEngine: trend, volatility, skew, spread, clip, gates
//!               └─ Connector: adjust_for_budget (all-or-none) → submit
//! ```

pub mod config;
pub mod connector;
pub mod error;
pub mod estimate;
pub mod inventory;
pub mod pricing;
pub mod quote_engine;
pub mod scheduler;
pub mod spread;
pub mod strategy;
pub mod trend;
pub mod volatility;

pub use config::QuoteConfig;
pub use connector::{AccountService, Connector, FillEvent, MarketDataFeed, OrderService};
pub use error::{StrategyError, StrategyResult};
pub use estimate::{DegradeReason, Estimate};
pub use inventory::{InventorySkewCalculator, InventoryState};
pub use pricing::{PriceClipper, PricingRegime};
pub use quote_engine::{OrderProposal, QuoteEngine, QuoteOutcome, QuoteSnapshot, SkipReason};
pub use scheduler::{EnginePhase, EngineState, RefreshScheduler};
pub use spread::SpreadSmoother;
pub use strategy::{PmmStrategy, TickOutcome};
pub use trend::{Trend, TrendClassifier};
pub use volatility::VolatilityEstimator;
