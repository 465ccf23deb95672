//! Moving-average crossover trend detection.
//!
//! Compares the simple average of the last `fast` closes with the
//! average of the last `slow` closes. A crossover heuristic, not a
//! statistical test: exact ties are sideways.

use std::fmt;

use pmm_core::PriceWindow;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::estimate::{DegradeReason, Estimate};

/// Directional market regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Uptrend,
    Downtrend,
    #[default]
    Sideways,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uptrend => write!(f, "uptrend"),
            Self::Downtrend => write!(f, "downtrend"),
            Self::Sideways => write!(f, "sideways"),
        }
    }
}

/// Fast/slow SMA crossover classifier.
#[derive(Debug, Clone, Copy)]
pub struct TrendClassifier {
    fast: usize,
    slow: usize,
}

impl TrendClassifier {
    pub fn new(fast: usize, slow: usize) -> Self {
        Self { fast, slow }
    }

    /// Classify the window; `Sideways` (degraded) on short or degenerate input.
    pub fn classify(&self, window: &PriceWindow) -> Estimate<Trend> {
        let estimate = self.compute(window);
        if let Estimate::Degraded { reason, .. } = &estimate {
            if reason.is_insufficient_data() {
                debug!(%reason, "Not enough candle data to detect trend");
            } else {
                warn!(%reason, "Trend detection failed, assuming sideways");
            }
        }
        estimate
    }

    fn compute(&self, window: &PriceWindow) -> Estimate<Trend> {
        if self.fast == 0 || self.slow == 0 {
            return Estimate::degraded(
                Trend::Sideways,
                DegradeReason::InvalidParameter("moving average length must be > 0"),
            );
        }

        let required = self.fast.max(self.slow);
        if window.len() < required {
            return Estimate::degraded(
                Trend::Sideways,
                DegradeReason::InsufficientData {
                    required,
                    available: window.len(),
                },
            );
        }

        let averages = tail_mean(window, self.fast).zip(tail_mean(window, self.slow));
        let Some((ma_fast, ma_slow)) = averages else {
            return Estimate::degraded(
                Trend::Sideways,
                DegradeReason::Arithmetic("moving average"),
            );
        };

        let trend = match ma_fast.cmp(&ma_slow) {
            std::cmp::Ordering::Greater => Trend::Uptrend,
            std::cmp::Ordering::Less => Trend::Downtrend,
            std::cmp::Ordering::Equal => Trend::Sideways,
        };
        Estimate::Ok(trend)
    }
}

impl Default for TrendClassifier {
    fn default() -> Self {
        Self::new(5, 20)
    }
}

/// Mean of the last `n` closes, `None` on overflow or short window.
fn tail_mean(window: &PriceWindow, n: usize) -> Option<Decimal> {
    let closes = window.tail_closes(n)?;
    let sum = closes
        .iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v))?;
    sum.checked_div(Decimal::from(n as u64))
}
