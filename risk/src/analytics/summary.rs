//! Summary statistics of a portfolio return series
//!
//! - Mean return and sample volatility, daily and annualized
//! - Sharpe-style ratio: mean / volatility with no risk-free rate
//! - Equal-width return histogram

use crate::analytics::dispersion::{annualize_volatility, mean, sample_std};
use crate::error::{Result, RiskError};
use serde::Serialize;

/// Overview figures for a return series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnSummary {
    /// Number of return observations
    pub observations: usize,

    /// Mean period return
    pub mean_return: f64,

    /// Sample standard deviation of period returns
    pub volatility: f64,

    /// Volatility scaled by √252
    pub annualized_volatility: f64,

    /// Mean return divided by volatility, per period, no risk-free rate
    pub sharpe_ratio: f64,
}

/// Summarize a return series
pub fn summarize(returns: &[f64]) -> Result<ReturnSummary> {
    let volatility = sample_std(returns)?;
    let mean_return = mean(returns)?;

    if volatility == 0.0 {
        return Err(RiskError::ZeroVariance("portfolio returns".to_string()));
    }

    Ok(ReturnSummary {
        observations: returns.len(),
        mean_return,
        volatility,
        annualized_volatility: annualize_volatility(volatility),
        sharpe_ratio: mean_return / volatility,
    })
}

/// Equal-width histogram
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    /// Bin edges, `counts.len() + 1` of them
    pub edges: Vec<f64>,

    /// Observations per bin
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Bin values into `bins` equal-width bins spanning `[min, max]`
///
/// Bins are half-open except the last, which also holds the maximum. When
/// every value is equal the range is widened by 0.5 on each side.
pub fn histogram(values: &[f64], bins: usize) -> Result<Histogram> {
    if bins == 0 {
        return Err(RiskError::InvalidParameter(
            "Histogram needs at least one bin".to_string(),
        ));
    }
    if values.is_empty() {
        return Err(RiskError::InsufficientData {
            required: 1,
            actual: 0,
        });
    }
    if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
        return Err(RiskError::NonFiniteValue(pos));
    }

    let mut lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }

    let width = (hi - lo) / bins as f64;
    let edges = (0..=bins).map(|i| lo + width * i as f64).collect();

    let mut counts = vec![0; bins];
    for v in values {
        let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }

    Ok(Histogram { edges, counts })
}
