//! Volatility and sample moments

use crate::error::{Result, RiskError};
use crate::table::Series;

/// Trading days per year used to annualize daily statistics
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Arithmetic mean of a slice
pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(RiskError::InsufficientData {
            required: 1,
            actual: 0,
        });
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (divides by `n - 1`)
pub fn sample_std(values: &[f64]) -> Result<f64> {
    if values.len() < 2 {
        return Err(RiskError::InsufficientData {
            required: 2,
            actual: values.len(),
        });
    }

    let mu = mean(values)?;
    let variance = values.iter().map(|v| (v - mu).powi(2)).sum::<f64>()
        / (values.len() - 1) as f64;

    Ok(variance.sqrt())
}

/// Scale a daily volatility to an annual one
pub fn annualize_volatility(daily: f64) -> f64 {
    daily * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Rolling sample standard deviation over a trailing window
///
/// Dates before `window` observations are available carry `None`. A series
/// shorter than the window is all `None`, not an error.
pub fn rolling_vol(
    port_ret: &Series,
    window: usize,
    annualize: bool,
) -> Result<Series<Option<f64>>> {
    if window < 2 {
        return Err(RiskError::InvalidWindow(window));
    }

    let values = port_ret.values();
    let mut vols = vec![None; values.len()];

    for end in window..=values.len() {
        let daily = sample_std(&values[end - window..end])?;
        vols[end - 1] = Some(if annualize {
            annualize_volatility(daily)
        } else {
            daily
        });
    }

    Ok(Series::from_parts(port_ret.dates().to_vec(), vols))
}
