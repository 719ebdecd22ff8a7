//! Cumulative return and drawdown paths
//!
//! Both paths compound from the first available return: wealth on date `t`
//! is the product of `(1 + r)` over every return up to and including `t`.

use crate::error::{Result, RiskError};
use crate::table::Series;

/// Running wealth, starting from 1.0 before the first return
fn wealth_path(port_ret: &Series) -> Vec<f64> {
    port_ret
        .values()
        .iter()
        .scan(1.0, |wealth, r| {
            *wealth *= 1.0 + r;
            Some(*wealth)
        })
        .collect()
}

/// Cumulative return on each date: running product of `(1 + r)` minus 1
///
/// The first value equals the first return.
pub fn cumulative_returns(port_ret: &Series) -> Series {
    let values = wealth_path(port_ret).into_iter().map(|w| w - 1.0).collect();
    Series::from_parts(port_ret.dates().to_vec(), values)
}

/// Drawdown on each date: `wealth / running_peak - 1`
///
/// The peak includes the current date, so the value is 0 at the first date
/// and at every new peak, and never positive.
pub fn drawdown(port_ret: &Series) -> Series {
    let mut peak = f64::NEG_INFINITY;
    let values = wealth_path(port_ret)
        .into_iter()
        .map(|wealth| {
            peak = peak.max(wealth);
            if peak > 0.0 {
                (wealth / peak - 1.0).min(0.0)
            } else {
                // Wealth wiped out on or before the first date
                -1.0
            }
        })
        .collect();

    Series::from_parts(port_ret.dates().to_vec(), values)
}

/// Maximum drawdown: the most negative value of the drawdown path
pub fn max_drawdown(port_ret: &Series) -> Result<f64> {
    if port_ret.is_empty() {
        return Err(RiskError::InsufficientData {
            required: 1,
            actual: 0,
        });
    }

    Ok(drawdown(port_ret)
        .values()
        .iter()
        .copied()
        .fold(0.0, f64::min))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Duration, NaiveDate};

    fn series(values: &[f64]) -> Series {
        let start = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
        let dates = (0..values.len())
            .map(|i| start + Duration::days(i as i64))
            .collect();
        Series::new(dates, values.to_vec()).unwrap()
    }

    #[test]
    fn test_cumulative_returns() {
        let port = series(&[0.10, -0.05, 0.02]);
        let cum = cumulative_returns(&port);

        assert_eq!(cum.dates(), port.dates());
        assert_relative_eq!(cum.values()[0], 0.10, epsilon = 1e-12);
        assert_relative_eq!(cum.values()[1], 1.10 * 0.95 - 1.0, epsilon = 1e-12);
        assert_relative_eq!(cum.values()[2], 1.10 * 0.95 * 1.02 - 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_cumulative_returns_is_deterministic() {
        let port = series(&[0.01, 0.02, -0.03]);
        assert_eq!(cumulative_returns(&port), cumulative_returns(&port));
    }

    #[test]
    fn test_drawdown_path() {
        let port = series(&[0.10, 0.05, -0.20, -0.10, 0.15, 0.05]);
        let dd = drawdown(&port);

        assert_eq!(dd.values()[0], 0.0);
        assert_eq!(dd.values()[1], 0.0);
        assert_relative_eq!(dd.values()[2], -0.20, epsilon = 1e-12);
        assert_relative_eq!(dd.values()[3], 0.80 * 0.90 - 1.0, epsilon = 1e-12);
        assert!(dd.values().iter().all(|v| *v <= 0.0));
    }

    #[test]
    fn test_first_date_is_zero_even_after_a_loss() {
        let dd = drawdown(&series(&[-0.10, -0.10]));
        assert_eq!(dd.values()[0], 0.0);
        assert_relative_eq!(dd.values()[1], -0.10, epsilon = 1e-12);
    }

    #[test]
    fn test_max_drawdown() {
        let port = series(&[0.10, 0.05, -0.20, -0.10, 0.15, 0.05]);
        let max_dd = max_drawdown(&port).unwrap();

        // Peak after the second return, trough after the fourth
        assert_relative_eq!(max_dd, 0.80 * 0.90 - 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_max_drawdown_monotonic_gains() {
        let port = series(&[0.01, 0.02, 0.03]);
        assert_eq!(max_drawdown(&port).unwrap(), 0.0);
    }

    #[test]
    fn test_max_drawdown_empty() {
        let empty = series(&[]);
        assert!(max_drawdown(&empty).is_err());
        assert!(drawdown(&empty).is_empty());
    }
}
