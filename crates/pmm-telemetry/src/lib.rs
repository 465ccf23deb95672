//! Structured logging for the PMM bot.
//!
//! JSON output in production, pretty output in development, filtered
//! through `RUST_LOG`.

pub mod error;
pub mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::init_logging;
