//! Main application orchestration.
//!
//! Drives the strategy from a fixed-interval clock against the paper
//! venue. Each tick steps the venue, reports fills, then hands the
//! tick to the strategy.

use crate::config::AppConfig;
use crate::error::AppResult;
use crate::paper::PaperConnector;
use chrono::Utc;
use pmm_strategy::{OrderService, PmmStrategy, TickOutcome};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Main application.
#[derive(Debug)]
pub struct Application {
    config: AppConfig,
    strategy: PmmStrategy,
    connector: PaperConnector,
    ticks: u64,
}

impl Application {
    /// Create a new application. `start_ms` anchors the venue's warm-up history.
    pub fn new(config: AppConfig, start_ms: u64) -> AppResult<Self> {
        config.validate()?;

        let connector = PaperConnector::new(
            config.paper.clone(),
            config.strategy.trading_pair.clone(),
            config.strategy.price_window_len,
            start_ms,
        )?;
        let strategy = PmmStrategy::new(config.exchange.clone(), config.strategy.clone())?;

        info!(
            exchange = %config.exchange,
            market = %config.strategy.trading_pair,
            order_amount = %config.strategy.order_amount,
            refresh_secs = config.strategy.order_refresh_time_secs,
            price_type = %config.strategy.price_type,
            "Application initialized"
        );

        Ok(Self {
            config,
            strategy,
            connector,
            ticks: 0,
        })
    }

    pub fn strategy(&self) -> &PmmStrategy {
        &self.strategy
    }

    pub fn connector(&self) -> &PaperConnector {
        &self.connector
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Process one clock tick.
    ///
    /// Venue errors abort the tick. Strategy lookup failures are
    /// returned as well; the strategy retries them on the next tick.
    pub fn tick(&mut self, now_ms: u64) -> AppResult<TickOutcome> {
        self.ticks += 1;

        for fill in self.connector.advance(now_ms)? {
            self.strategy.on_fill(&fill);
        }

        let outcome = self.strategy.on_tick(&mut self.connector, now_ms)?;
        if outcome != TickOutcome::Idle {
            debug!(tick = self.ticks, ?outcome, "Tick processed");
        }
        Ok(outcome)
    }

    /// Run until Ctrl+C or `max_ticks`.
    pub async fn run(mut self) -> AppResult<()> {
        info!(
            tick_interval_ms = self.config.tick_interval_ms,
            max_ticks = ?self.config.max_ticks,
            "Starting application"
        );

        let mut clock = tokio::time::interval(Duration::from_millis(self.config.tick_interval_ms));

        loop {
            tokio::select! {
                _ = clock.tick() => {
                    let now_ms = Utc::now().timestamp_millis().max(0) as u64;
                    if let Err(e) = self.tick(now_ms) {
                        warn!(error = %e, tick = self.ticks, "Tick failed");
                    }
                    if self.config.max_ticks.is_some_and(|max| self.ticks >= max) {
                        info!(ticks = self.ticks, "Tick limit reached");
                        break;
                    }
                }

                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        self.connector.cancel_all();
        info!(
            ticks = self.ticks,
            base = %self.connector.balance_of(self.config.strategy.trading_pair.base()),
            quote = %self.connector.balance_of(self.config.strategy.trading_pair.quote()),
            "Shutting down"
        );
        Ok(())
    }
}
