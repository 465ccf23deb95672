//! Strategy error types.
//!
//! Only external-service failures surface as errors. Estimator
//! failures degrade to neutral values and gate rejections are
//! ordinary outcomes.

use pmm_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("Balance unavailable for {asset}: {reason}")]
    BalanceUnavailable { asset: String, reason: String },

    #[error("Reference price unavailable for {pair}: {reason}")]
    PriceUnavailable { pair: String, reason: String },

    #[error("Market data feed unavailable for {pair}: {reason}")]
    FeedUnavailable { pair: String, reason: String },

    #[error("Order rejected: {0}")]
    OrderRejected(String),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}

pub type StrategyResult<T> = Result<T, StrategyError>;
