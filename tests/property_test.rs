//! Property tests over generated bar sequences.

mod common;

use common::*;
use optbench::domain::align::{align_bars, AlignOptions};
use optbench::domain::backtest::{BacktestConfig, ValuationEngine};
use optbench::domain::ohlcv::PriceBar;
use proptest::prelude::*;

fn closes_strategy() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.5f64..500.0, 1..60)
}

fn bars(closes: &[f64]) -> Vec<PriceBar> {
    bars_from_closes("2023-06-01", closes)
}

fn make_engine(bars: Vec<PriceBar>, initial_cash: f64) -> ValuationEngine {
    ValuationEngine::new(bars, BacktestConfig { initial_cash }).unwrap()
}

proptest! {
    #[test]
    fn ledger_identity_holds_for_every_record(
        closes in closes_strategy(),
        initial in 0.0f64..50_000.0,
    ) {
        let result = make_engine(bars(&closes), initial).run();
        prop_assert_eq!(result.valuations.len(), closes.len());
        for v in &result.valuations {
            prop_assert!(v.cash >= 0.0);
            let marked = v.cash + v.position as f64 * v.close;
            prop_assert!((v.total_value - marked).abs() <= 1e-9 * marked.abs().max(1.0));
        }
    }

    #[test]
    fn runs_are_deterministic(closes in closes_strategy(), initial in 1.0f64..50_000.0) {
        let engine = make_engine(bars(&closes), initial);
        prop_assert_eq!(engine.run(), engine.run());
    }

    #[test]
    fn first_return_undefined_rest_defined(
        closes in closes_strategy(),
        initial in 1.0f64..50_000.0,
    ) {
        let returns = make_engine(bars(&closes), initial).compute_returns();
        prop_assert_eq!(returns.records()[0].value, None);
        prop_assert!(returns.records()[1..].iter().all(|r| r.value.is_some()));
    }

    #[test]
    fn aligned_full_overlap_drops_first_row(
        closes in closes_strategy(),
        initial in 1.0f64..50_000.0,
    ) {
        let bars = bars(&closes);
        let returns = make_engine(bars.clone(), initial).compute_returns();
        let combined = align_bars(&bars, &returns, &AlignOptions::default()).unwrap();
        prop_assert_eq!(combined.len(), closes.len() - 1);
        prop_assert!(combined.records().windows(2).all(|w| w[0].date < w[1].date));
    }
}
