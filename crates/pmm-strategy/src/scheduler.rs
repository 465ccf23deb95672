//! Refresh cadence and cross-cycle engine state.
//!
//! The scheduler is level-triggered: a tick at or after the due time
//! runs exactly one recompute, however late it is, and the next due
//! time counts from that tick.

use std::fmt;

use rust_decimal::Decimal;

use crate::trend::Trend;

/// Where the quoting cycle currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnginePhase {
    /// Waiting for the next due time.
    #[default]
    Idle,
    /// Computing quotes.
    Evaluating,
    /// Proposals handed to the order service.
    Quoting,
}

impl fmt::Display for EnginePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "IDLE"),
            Self::Evaluating => write!(f, "EVALUATING"),
            Self::Quoting => write!(f, "QUOTING"),
        }
    }
}

/// State carried between ticks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineState {
    /// Next recompute time in milliseconds; 0 means due immediately.
    pub next_due_ms: u64,
    /// Last smoothed spread, `None` until the first priced cycle.
    pub previous_spread_multiplier: Option<Decimal>,
    /// Trend detected in the last priced cycle.
    pub last_trend: Option<Trend>,
    pub phase: EnginePhase,
}

impl EngineState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Decides once per tick whether quotes are recomputed.
#[derive(Debug, Clone, Copy)]
pub struct RefreshScheduler {
    refresh_interval_ms: u64,
}

impl RefreshScheduler {
    pub fn new(refresh_interval_ms: u64) -> Self {
        Self {
            refresh_interval_ms,
        }
    }

    pub fn is_due(&self, state: &EngineState, now_ms: u64) -> bool {
        now_ms >= state.next_due_ms
    }

    /// Schedule the next recompute relative to this tick.
    pub fn schedule_next(&self, state: &mut EngineState, now_ms: u64) {
        state.next_due_ms = now_ms.saturating_add(self.refresh_interval_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_due_immediately() {
        let state = EngineState::new();
        let scheduler = RefreshScheduler::new(15_000);

        assert!(scheduler.is_due(&state, 0));
        assert_eq!(state.previous_spread_multiplier, None);
        assert_eq!(state.last_trend, None);
        assert_eq!(state.phase, EnginePhase::Idle);
    }

    #[test]
    fn test_not_due_until_interval_elapsed() {
        let mut state = EngineState::new();
        let scheduler = RefreshScheduler::new(15_000);

        scheduler.schedule_next(&mut state, 0);
        assert!(!scheduler.is_due(&state, 1_000));
        assert!(!scheduler.is_due(&state, 14_999));
        assert!(scheduler.is_due(&state, 15_000));

        scheduler.schedule_next(&mut state, 15_000);
        assert_eq!(state.next_due_ms, 30_000);
    }

    #[test]
    fn test_late_tick_schedules_from_tick_time() {
        let mut state = EngineState::new();
        let scheduler = RefreshScheduler::new(15_000);

        scheduler.schedule_next(&mut state, 0);
        // Host stalled for several intervals: one recompute, no catch-up
        assert!(scheduler.is_due(&state, 100_000));
        scheduler.schedule_next(&mut state, 100_000);
        assert_eq!(state.next_due_ms, 115_000);
        assert!(!scheduler.is_due(&state, 100_001));
    }
}
