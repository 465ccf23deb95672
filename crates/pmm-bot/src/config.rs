//! Application configuration.

use crate::error::{AppError, AppResult};
use pmm_core::Price;
use pmm_strategy::QuoteConfig;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Synthetic venue used for paper trading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperConfig {
    /// Starting base asset balance.
    #[serde(default = "default_base_balance")]
    pub base_balance: Decimal,

    /// Starting quote asset balance.
    #[serde(default = "default_quote_balance")]
    pub quote_balance: Decimal,

    /// Price at tick 0.
    #[serde(default = "default_start_price")]
    pub start_price: Price,

    /// Fractional amplitude of the oscillation around the drift line.
    #[serde(default = "default_amplitude")]
    pub amplitude: Decimal,

    /// Ticks per full oscillation.
    #[serde(default = "default_period_ticks")]
    pub period_ticks: u64,

    /// Fractional drift per tick. Positive trends up.
    #[serde(default)]
    pub drift_per_tick: Decimal,

    /// Closes seeded into the window before the first tick.
    #[serde(default = "default_warmup_samples")]
    pub warmup_samples: usize,

    /// Spacing of the seeded closes (ms).
    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,
}

fn default_base_balance() -> Decimal {
    Decimal::ONE
}

fn default_quote_balance() -> Decimal {
    Decimal::from(2000)
}

fn default_start_price() -> Price {
    Price::new(Decimal::from(2000))
}

fn default_amplitude() -> Decimal {
    Decimal::new(5, 3)
}

fn default_period_ticks() -> u64 {
    240
}

fn default_warmup_samples() -> usize {
    30
}

fn default_sample_interval_ms() -> u64 {
    1_000
}

impl Default for PaperConfig {
    fn default() -> Self {
        Self {
            base_balance: default_base_balance(),
            quote_balance: default_quote_balance(),
            start_price: default_start_price(),
            amplitude: default_amplitude(),
            period_ticks: default_period_ticks(),
            drift_per_tick: Decimal::ZERO,
            warmup_samples: default_warmup_samples(),
            sample_interval_ms: default_sample_interval_ms(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Venue name used in fill logs.
    #[serde(default = "default_exchange")]
    pub exchange: String,

    /// Clock tick interval (ms).
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Stop after this many ticks. Runs until Ctrl+C when unset.
    #[serde(default)]
    pub max_ticks: Option<u64>,

    #[serde(default)]
    pub strategy: QuoteConfig,

    #[serde(default)]
    pub paper: PaperConfig,
}

fn default_exchange() -> String {
    "binance_paper_trade".to_string()
}

fn default_tick_interval_ms() -> u64 {
    1_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            exchange: default_exchange(),
            tick_interval_ms: default_tick_interval_ms(),
            max_ticks: None,
            strategy: QuoteConfig::default(),
            paper: PaperConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from `PMM_CONFIG` or `config/default.toml`, falling back to defaults.
    pub fn load() -> AppResult<Self> {
        let config_path =
            std::env::var("PMM_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());

        if Path::new(&config_path).exists() {
            Self::from_file(&config_path)
        } else {
            tracing::warn!(path = %config_path, "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        Self::from_toml(&content)
    }

    /// Parse and validate TOML text.
    pub fn from_toml(content: &str) -> AppResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        self.strategy.validate()?;

        if self.exchange.trim().is_empty() {
            return Err(AppError::Config("exchange must not be empty".to_string()));
        }
        if self.tick_interval_ms == 0 {
            return Err(AppError::Config("tick_interval_ms must be positive".to_string()));
        }
        let paper = &self.paper;
        if !paper.start_price.is_positive() {
            return Err(AppError::Config("paper.start_price must be positive".to_string()));
        }
        if paper.base_balance.is_sign_negative() || paper.quote_balance.is_sign_negative() {
            return Err(AppError::Config(
                "paper balances must not be negative".to_string(),
            ));
        }
        if paper.amplitude.is_sign_negative() || paper.amplitude >= Decimal::ONE {
            return Err(AppError::Config(
                "paper.amplitude must be in [0, 1)".to_string(),
            ));
        }
        if paper.period_ticks == 0 {
            return Err(AppError::Config("paper.period_ticks must be positive".to_string()));
        }
        Ok(())
    }
}
