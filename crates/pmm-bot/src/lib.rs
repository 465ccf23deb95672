//! Paper-trading host for the trend-aware PMM strategy.
//!
//! Wires configuration, logging, the paper venue and the strategy
//! into a clock-driven application.

pub mod app;
pub mod config;
pub mod error;
pub mod paper;

pub use app::Application;
pub use config::{AppConfig, PaperConfig};
pub use error::{AppError, AppResult};
pub use paper::PaperConnector;
