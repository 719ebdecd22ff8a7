//! Property-based tests for the analytics functions.
//!
//! These tests verify that the invariants of each computation hold across
//! randomly generated return data, using `proptest`.

use ag_portfolio_risk::analytics::{
    correlation, cumulative_returns, drawdown, historical_cvar, historical_var, max_drawdown,
    portfolio_returns, quantile, rolling_vol,
};
use ag_portfolio_risk::{ReturnTable, Series};
use chrono::{Duration, NaiveDate};
use proptest::prelude::*;

// =============================================================================
// Generators
// =============================================================================

fn dates(n: usize) -> Vec<NaiveDate> {
    let start = NaiveDate::from_ymd_opt(2021, 6, 1).unwrap();
    (0..n).map(|i| start + Duration::days(i as i64)).collect()
}

fn series(values: Vec<f64>) -> Series {
    Series::new(dates(values.len()), values).unwrap()
}

/// Daily returns in a plausible range
fn arb_returns(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    proptest::collection::vec(-0.08f64..0.08, min_len..=max_len)
}

/// A return table with 1 to 4 instruments and a matching positive weight vector
fn arb_table_and_weights() -> impl Strategy<Value = (ReturnTable, Vec<f64>)> {
    (1usize..=4, 2usize..=40)
        .prop_flat_map(|(width, len)| {
            (
                proptest::collection::vec(
                    proptest::collection::vec(-0.08f64..0.08, width),
                    len,
                ),
                proptest::collection::vec(0.05f64..10.0, width),
            )
        })
        .prop_map(|(rows, weights)| {
            let instruments = (0..weights.len()).map(|i| format!("I{}", i)).collect();
            let table = ReturnTable::new(dates(rows.len()), instruments, rows).unwrap();
            (table, weights)
        })
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Multiplying every weight by the same positive constant leaves
    /// portfolio returns unchanged
    #[test]
    fn prop_weight_scale_invariance(
        (table, weights) in arb_table_and_weights(),
        scale in 0.01f64..100.0,
    ) {
        let base = portfolio_returns(&table, &weights).unwrap();
        let scaled_weights: Vec<f64> = weights.iter().map(|w| w * scale).collect();
        let scaled = portfolio_returns(&table, &scaled_weights).unwrap();

        for (a, b) in base.values().iter().zip(scaled.values()) {
            prop_assert!((a - b).abs() <= 1e-12);
        }
    }

    /// Successive cumulative values recover the period returns
    #[test]
    fn prop_cumulative_round_trip(returns in arb_returns(1, 60)) {
        let cumulative = cumulative_returns(&series(returns.clone()));
        let wealth: Vec<f64> = cumulative.values().iter().map(|c| 1.0 + c).collect();

        prop_assert!((wealth[0] - 1.0 - returns[0]).abs() <= 1e-12);
        for t in 1..returns.len() {
            let recovered = wealth[t] / wealth[t - 1] - 1.0;
            prop_assert!((recovered - returns[t]).abs() <= 1e-9);
        }
    }

    /// Drawdown is never positive, starts at zero, and its minimum is the
    /// maximum drawdown
    #[test]
    fn prop_drawdown_bounds(returns in arb_returns(1, 60)) {
        let port_ret = series(returns);
        let path = drawdown(&port_ret);

        prop_assert_eq!(path.values()[0], 0.0);
        prop_assert!(path.values().iter().all(|d| *d <= 0.0 && *d >= -1.0));

        let lowest = path.values().iter().copied().fold(0.0, f64::min);
        prop_assert_eq!(max_drawdown(&port_ret).unwrap(), lowest);
    }

    /// Constant returns have zero rolling volatility
    #[test]
    fn prop_constant_rolling_vol_is_zero(
        value in -0.05f64..0.05,
        len in 2usize..50,
        window in 2usize..10,
        annualize in any::<bool>(),
    ) {
        let vols = rolling_vol(&series(vec![value; len]), window, annualize).unwrap();

        for (t, vol) in vols.values().iter().enumerate() {
            if t + 1 < window {
                prop_assert!(vol.is_none());
            } else {
                prop_assert!(vol.unwrap().abs() <= 1e-12);
            }
        }
    }

    /// Expected shortfall is at least as large a loss as VaR
    #[test]
    fn prop_cvar_at_least_var(returns in arb_returns(2, 200), alpha in 0.005f64..0.5) {
        let var = historical_var(&returns, alpha).unwrap();
        let cvar = historical_cvar(&returns, alpha).unwrap();
        prop_assert!(cvar >= var - 1e-12);
    }

    /// Higher confidence never lowers historical VaR
    #[test]
    fn prop_var_monotone_in_confidence(
        returns in arb_returns(2, 200),
        a in 0.005f64..0.5,
        b in 0.005f64..0.5,
    ) {
        let (low, high) = if a < b { (a, b) } else { (b, a) };
        let var_low_alpha = historical_var(&returns, low).unwrap();
        let var_high_alpha = historical_var(&returns, high).unwrap();
        prop_assert!(var_low_alpha >= var_high_alpha - 1e-15);
    }

    /// Quantiles stay within the sample range
    #[test]
    fn prop_quantile_within_range(values in arb_returns(1, 100), p in 0.0f64..=1.0) {
        let q = quantile(&values, p).unwrap();
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        prop_assert!(q >= min - 1e-15 && q <= max + 1e-15);
    }

    /// Correlation matrices are symmetric with a unit diagonal and entries
    /// in [-1, 1]
    #[test]
    fn prop_correlation_shape((table, _) in arb_table_and_weights()) {
        prop_assume!(table.len() >= 3);

        prop_assume!((0..table.width()).all(|j| {
            let column: Vec<f64> = table.rows().iter().map(|row| row[j]).collect();
            let min = column.iter().copied().fold(f64::INFINITY, f64::min);
            let max = column.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            max - min > 1e-6
        }));

        let matrix = correlation(&table).unwrap();
        let rows = matrix.to_rows();
        let n = matrix.size();
        prop_assert_eq!(n, table.width());

        for i in 0..n {
            prop_assert_eq!(rows[i][i], 1.0);
            for j in 0..n {
                prop_assert_eq!(rows[i][j], rows[j][i]);
                prop_assert!((-1.0..=1.0).contains(&rows[i][j]));
            }
        }
    }
}
