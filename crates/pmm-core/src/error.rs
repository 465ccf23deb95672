//! Error types for pmm-core.

use thiserror::Error;

/// Core error types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    #[error("Invalid trading pair: {0}")]
    InvalidTradingPair(String),

    #[error("Out-of-order price sample: {timestamp_ms} is before {last_timestamp_ms}")]
    OutOfOrderSample {
        timestamp_ms: u64,
        last_timestamp_ms: u64,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
