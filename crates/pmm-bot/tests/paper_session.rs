//! End-to-end sessions against the paper venue.
//!
//! Run with: cargo test -p pmm-bot --test paper_session

use pmm_bot::{AppConfig, Application, PaperConfig};
use pmm_core::Price;
use pmm_strategy::{EnginePhase, SkipReason, TickOutcome, Trend};
use rust_decimal_macros::dec;

const START_MS: u64 = 1_700_000_000_000;
const TICK_MS: u64 = 1_000;

fn config_with(paper: PaperConfig) -> AppConfig {
    AppConfig {
        paper,
        ..Default::default()
    }
}

fn run_ticks(app: &mut Application, count: u64) -> Vec<TickOutcome> {
    (1..=count)
        .map(|k| app.tick(START_MS + k * TICK_MS).expect("tick"))
        .collect()
}

#[test]
fn test_requotes_on_refresh_cadence() {
    let mut app = Application::new(AppConfig::default(), START_MS).unwrap();

    let outcomes = run_ticks(&mut app, 60);

    let active: Vec<usize> = outcomes
        .iter()
        .enumerate()
        .filter(|(_, o)| **o != TickOutcome::Idle)
        .map(|(i, _)| i)
        .collect();
    assert_eq!(active, vec![0, 15, 30, 45]);
    for i in active {
        assert_eq!(outcomes[i], TickOutcome::Quoted { submitted: 2 });
    }
    assert_eq!(app.strategy().state().phase, EnginePhase::Quoting);
}

#[test]
fn test_price_swings_fill_resting_orders() {
    let paper = PaperConfig {
        amplitude: dec!(0.05),
        period_ticks: 20,
        ..Default::default()
    };
    let mut app = Application::new(config_with(paper), START_MS).unwrap();

    run_ticks(&mut app, 200);

    let connector = app.connector();
    assert_ne!(connector.balance_of("ETH"), dec!(1));
    assert_ne!(connector.balance_of("USDT"), dec!(2000));
}

#[test]
fn test_heavy_inventory_stops_quoting() {
    let paper = PaperConfig {
        base_balance: dec!(100),
        quote_balance: dec!(10),
        ..Default::default()
    };
    let mut app = Application::new(config_with(paper), START_MS).unwrap();

    let outcome = app.tick(START_MS + TICK_MS).unwrap();

    assert!(matches!(
        outcome,
        TickOutcome::Skipped(SkipReason::ExposureLimit { .. })
    ));
    assert_eq!(app.connector().open_order_count(), 0);
    assert_eq!(app.strategy().state().phase, EnginePhase::Idle);
}

#[test]
fn test_unfunded_side_blocks_both() {
    // Balanced by value but short of one order's base amount
    let paper = PaperConfig {
        base_balance: dec!(0.01),
        quote_balance: dec!(20),
        amplitude: dec!(0),
        ..Default::default()
    };
    let mut app = Application::new(config_with(paper), START_MS).unwrap();

    let outcome = app.tick(START_MS + TICK_MS).unwrap();

    assert_eq!(outcome, TickOutcome::Unfunded { requested: 2 });
    assert_eq!(app.connector().open_order_count(), 0);
}

#[test]
fn test_falling_market_detected_as_downtrend() {
    let paper = PaperConfig {
        amplitude: dec!(0),
        drift_per_tick: dec!(-0.001),
        ..Default::default()
    };
    let mut app = Application::new(config_with(paper), START_MS).unwrap();

    app.tick(START_MS + TICK_MS).unwrap();

    assert_eq!(app.connector().mid_price(), Price::new(dec!(1998)));
    assert_eq!(app.strategy().state().last_trend, Some(Trend::Downtrend));
}

#[test]
fn test_cancel_before_requote_keeps_book_small() {
    let mut app = Application::new(AppConfig::default(), START_MS).unwrap();

    for k in 1..=90 {
        let outcome = app.tick(START_MS + k * TICK_MS).unwrap();
        if let TickOutcome::Quoted { submitted } = outcome {
            assert_eq!(submitted, 2);
        }
        assert!(app.connector().open_order_count() <= 2);
    }
}
