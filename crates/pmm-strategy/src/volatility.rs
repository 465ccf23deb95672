//! Close-price volatility estimate.
//!
//! Volatility is the sample standard deviation of the last `length`
//! closes divided by the last close, a scale-free ratio. Until the
//! window holds `length` closes the estimate is zero, which the
//! spread stage turns into the minimum spread.

use pmm_core::PriceWindow;
use rust_decimal::{Decimal, MathematicalOps};
use tracing::{debug, warn};

use crate::estimate::{DegradeReason, Estimate};

/// Normalized dispersion of recent closes.
#[derive(Debug, Clone, Copy)]
pub struct VolatilityEstimator {
    length: usize,
}

impl VolatilityEstimator {
    pub fn new(length: usize) -> Self {
        Self { length }
    }

    /// Estimate volatility; zero (degraded) on short or degenerate input.
    pub fn estimate(&self, window: &PriceWindow) -> Estimate<Decimal> {
        let estimate = self.compute(window);
        if let Estimate::Degraded { reason, .. } = &estimate {
            if reason.is_insufficient_data() {
                debug!(%reason, "Not enough candle data to calculate volatility");
            } else {
                warn!(%reason, "Volatility calculation failed, using zero");
            }
        }
        estimate
    }

    fn compute(&self, window: &PriceWindow) -> Estimate<Decimal> {
        let closes = match window.tail_closes(self.length) {
            Some(closes) => closes,
            None => {
                return Estimate::degraded(
                    Decimal::ZERO,
                    DegradeReason::InsufficientData {
                        required: self.length,
                        available: window.len(),
                    },
                )
            }
        };

        let normalized = sample_stddev(&closes).and_then(|stddev| {
            let last = closes.last().copied().unwrap_or(Decimal::ZERO);
            if last <= Decimal::ZERO {
                return Err(DegradeReason::NonPositivePrice);
            }
            stddev
                .checked_div(last)
                .ok_or(DegradeReason::Arithmetic("stddev / last close"))
        });

        match normalized {
            Ok(v) => Estimate::Ok(v),
            Err(reason) => Estimate::degraded(Decimal::ZERO, reason),
        }
    }
}

impl Default for VolatilityEstimator {
    fn default() -> Self {
        Self::new(30)
    }
}

/// Sample standard deviation (n - 1 denominator).
fn sample_stddev(values: &[Decimal]) -> Result<Decimal, DegradeReason> {
    if values.len() < 2 {
        return Err(DegradeReason::InvalidParameter(
            "volatility needs at least two closes",
        ));
    }
    let n = Decimal::from(values.len() as u64);

    let sum = values
        .iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v))
        .ok_or(DegradeReason::Arithmetic("sum of closes"))?;
    let mean = sum / n;

    let squared = values
        .iter()
        .try_fold(Decimal::ZERO, |acc, v| {
            let diff = v.checked_sub(mean)?;
            acc.checked_add(diff.checked_mul(diff)?)
        })
        .ok_or(DegradeReason::Arithmetic("sum of squared deviations"))?;

    let variance = squared / (n - Decimal::ONE);
    variance
        .sqrt()
        .ok_or(DegradeReason::Arithmetic("square root of variance"))
}
