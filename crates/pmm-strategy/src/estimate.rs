//! Fail-closed estimator results.
//!
//! Estimators never return errors. When they cannot produce a
//! signal they hand back a neutral value tagged with the reason, so
//! callers can quote on and tests can assert on the degraded path.

use std::fmt;

/// Why an estimator fell back to its neutral value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DegradeReason {
    /// The window holds fewer samples than the estimator needs.
    InsufficientData { required: usize, available: usize },
    /// An estimator parameter makes the computation undefined.
    InvalidParameter(&'static str),
    /// Decimal arithmetic overflowed or had no result.
    Arithmetic(&'static str),
    /// A price that must be positive was not.
    NonPositivePrice,
}

impl DegradeReason {
    /// Warm-up shortfalls are expected; everything else is a failure.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, Self::InsufficientData { .. })
    }
}

impl fmt::Display for DegradeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientData {
                required,
                available,
            } => write!(f, "insufficient data ({available}/{required} samples)"),
            Self::InvalidParameter(what) => write!(f, "invalid parameter: {what}"),
            Self::Arithmetic(what) => write!(f, "arithmetic failure: {what}"),
            Self::NonPositivePrice => write!(f, "non-positive price"),
        }
    }
}

/// Estimator output: a real signal or a tagged neutral fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Estimate<T> {
    Ok(T),
    Degraded { value: T, reason: DegradeReason },
}

impl<T: Copy> Estimate<T> {
    /// The value to use downstream, degraded or not.
    pub fn value(&self) -> T {
        match self {
            Self::Ok(v) => *v,
            Self::Degraded { value, .. } => *value,
        }
    }
}

impl<T> Estimate<T> {
    pub fn degraded(value: T, reason: DegradeReason) -> Self {
        Self::Degraded { value, reason }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    pub fn reason(&self) -> Option<&DegradeReason> {
        match self {
            Self::Ok(_) => None,
            Self::Degraded { reason, .. } => Some(reason),
        }
    }
}
