//! Numeric invariants checked over generated inputs.

use market_report_core::ErrorKind;
use market_report_indicators::{bollinger, ema, rsi, sma, stoch_rsi, stochastic, wma};
use proptest::prelude::*;

proptest! {
    #[test]
    fn moving_averages_of_constant_equal_constant(value in 0.01f64..100_000.0, period in 1usize..50, extra in 0usize..50) {
        let series = vec![value; period + extra];
        let tol = value * 1e-9;
        prop_assert!((sma(&series, period).unwrap() - value).abs() <= tol);
        prop_assert!((ema(&series, period).unwrap() - value).abs() <= tol);
        prop_assert!((wma(&series, period).unwrap() - value).abs() <= tol);
    }

    #[test]
    fn short_input_is_insufficient(period in 2usize..60) {
        let series: Vec<f64> = (0..period - 1).map(|i| 100.0 + i as f64).collect();
        prop_assert_eq!(sma(&series, period).unwrap_err().kind(), ErrorKind::InsufficientData);
        prop_assert_eq!(ema(&series, period).unwrap_err().kind(), ErrorKind::InsufficientData);
        prop_assert_eq!(rsi(&series, period).unwrap_err().kind(), ErrorKind::InsufficientData);
    }

    #[test]
    fn rsi_is_bounded(closes in prop::collection::vec(1.0f64..1_000.0, 15..120)) {
        let value = rsi(&closes, 14).unwrap();
        prop_assert!((0.0..=100.0).contains(&value));
    }

    #[test]
    fn stochastics_are_bounded(closes in prop::collection::vec(1.0f64..1_000.0, 40..120)) {
        let highs: Vec<f64> = closes.iter().map(|c| c * 1.01).collect();
        let lows: Vec<f64> = closes.iter().map(|c| c * 0.99).collect();
        let slow = stochastic(&highs, &lows, &closes, 14, 3).unwrap();
        prop_assert!((0.0..=100.0).contains(&slow.k));
        prop_assert!((0.0..=100.0).contains(&slow.d));

        let srsi = stoch_rsi(&closes, 14, 14, 3, 3).unwrap();
        prop_assert!((-1e-9..=100.0 + 1e-9).contains(&srsi.k));
    }

    #[test]
    fn bollinger_brackets_middle(closes in prop::collection::vec(1.0f64..1_000.0, 20..80)) {
        let bands = bollinger(&closes, 20, 2.0).unwrap();
        let middle = sma(&closes, 20).unwrap();
        prop_assert!((bands.middle - middle).abs() <= middle * 1e-12);
        prop_assert!(bands.upper >= bands.middle && bands.middle >= bands.lower);
    }
}
