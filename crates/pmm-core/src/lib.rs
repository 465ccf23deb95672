//! Core domain types for the PMM quoting engine.
//!
//! This crate provides fundamental types used throughout the system:
//! - `Price`, `Size`: Precision-safe numeric types
//! - `TradingPair`, `PriceType`: Market identification and reference price source
//! - `OrderSide`, `OrderType`, `ClientOrderId`: Order enums and identifiers
//! - `PriceSample`, `PriceWindow`: Bounded close-price history

pub mod decimal;
pub mod error;
pub mod market;
pub mod order;
pub mod window;

pub use decimal::{Price, Size};
pub use error::{CoreError, Result};
pub use market::{PriceType, TradingPair};
pub use order::{ClientOrderId, OrderSide, OrderType};
pub use window::{PriceSample, PriceWindow, DEFAULT_WINDOW_CAPACITY};
