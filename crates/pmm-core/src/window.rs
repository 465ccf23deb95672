//! Bounded close-price history.
//!
//! The window is append-only and evicts the oldest sample once it is
//! full. Samples are kept in chronological order, most recent last.

use std::collections::VecDeque;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::Price;
use crate::error::{CoreError, Result};

/// Default number of closes retained (1000 one-minute candles).
pub const DEFAULT_WINDOW_CAPACITY: usize = 1000;

/// A single close observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSample {
    /// Close time in milliseconds.
    pub timestamp_ms: u64,
    /// Close price.
    pub close: Price,
}

impl PriceSample {
    pub fn new(timestamp_ms: u64, close: Price) -> Self {
        Self {
            timestamp_ms,
            close,
        }
    }
}

/// Chronological, bounded sequence of close prices.
#[derive(Debug, Clone)]
pub struct PriceWindow {
    samples: VecDeque<PriceSample>,
    capacity: usize,
}

impl PriceWindow {
    /// Create an empty window retaining at most `capacity` samples.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity.min(DEFAULT_WINDOW_CAPACITY)),
            capacity,
        }
    }

    /// Build a window from closes spaced one minute apart.
    pub fn from_closes(closes: &[Decimal]) -> Result<Self> {
        let mut window = Self::new(closes.len().max(DEFAULT_WINDOW_CAPACITY));
        for (i, close) in closes.iter().enumerate() {
            window.push(PriceSample::new(i as u64 * 60_000, Price::new(*close)))?;
        }
        Ok(window)
    }

    /// Append a sample, evicting the oldest when full.
    ///
    /// Rejects non-positive closes and timestamps earlier than the
    /// current last sample.
    pub fn push(&mut self, sample: PriceSample) -> Result<()> {
        if !sample.close.is_positive() {
            return Err(CoreError::InvalidPrice(format!(
                "close must be positive, got {}",
                sample.close
            )));
        }
        if let Some(last) = self.samples.back() {
            if sample.timestamp_ms < last.timestamp_ms {
                return Err(CoreError::OutOfOrderSample {
                    timestamp_ms: sample.timestamp_ms,
                    last_timestamp_ms: last.timestamp_ms,
                });
            }
        }

        self.samples.push_back(sample);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Most recent sample.
    pub fn last(&self) -> Option<&PriceSample> {
        self.samples.back()
    }

    /// The last `n` closes in chronological order.
    ///
    /// Returns `None` when fewer than `n` samples are available.
    pub fn tail_closes(&self, n: usize) -> Option<Vec<Decimal>> {
        if n > self.samples.len() {
            return None;
        }
        Some(
            self.samples
                .iter()
                .skip(self.samples.len() - n)
                .map(|s| s.close.inner())
                .collect(),
        )
    }
}

impl Default for PriceWindow {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_CAPACITY)
    }
}
