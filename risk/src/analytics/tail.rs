//! Value at Risk and Conditional VaR from a return series
//!
//! Implements three one-period measures at tail probability
//! `alpha = 1 - confidence_level`:
//! - Historical VaR: negated `alpha`-quantile of the returns
//! - Historical CVaR (Expected Shortfall): negated mean of returns at or
//!   below that quantile
//! - Parametric VaR: `-(μ + σ·z_α)` under a normal assumption
//!
//! Every measure is reported as a positive loss magnitude, so larger always
//! means riskier. Parametric VaR assumes returns are roughly normal; nothing
//! here checks that assumption.

use crate::analytics::dispersion::{mean, sample_std};
use crate::error::{Result, RiskError};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

/// Tail risk measure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VarMethod {
    Historical,
    ConditionalHistorical,
    Parametric,
}

impl VarMethod {
    /// Loss magnitude for this measure at tail probability `alpha`
    pub fn loss(self, returns: &[f64], alpha: f64) -> Result<f64> {
        match self {
            VarMethod::Historical => historical_var(returns, alpha),
            VarMethod::ConditionalHistorical => historical_cvar(returns, alpha),
            VarMethod::Parametric => parametric_var(returns, alpha),
        }
    }
}

/// A tail risk figure as a return fraction and as a currency amount
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VarResult {
    /// Measure used
    pub method: VarMethod,

    /// Confidence level (e.g., 0.95, 0.99)
    pub confidence_level: f64,

    /// Loss as a positive return fraction
    pub loss: f64,

    /// Loss scaled by the invested amount
    pub amount: f64,
}

/// Compute one tail risk measure at a confidence level, scaled by `investment`
pub fn value_at_risk(
    returns: &[f64],
    confidence_level: f64,
    investment: f64,
    method: VarMethod,
) -> Result<VarResult> {
    let alpha = alpha_from_confidence(confidence_level)?;
    let loss = method.loss(returns, alpha)?;

    Ok(VarResult {
        method,
        confidence_level,
        loss,
        amount: loss * investment,
    })
}

/// Tail probability for a confidence level in (0, 1)
pub fn alpha_from_confidence(confidence_level: f64) -> Result<f64> {
    if !(confidence_level > 0.0 && confidence_level < 1.0) {
        return Err(RiskError::InvalidConfidenceLevel(confidence_level));
    }
    Ok(1.0 - confidence_level)
}

/// Quantile with linear interpolation between order statistics
///
/// The quantile sits at position `p * (n - 1)` of the sorted values.
pub fn quantile(values: &[f64], p: f64) -> Result<f64> {
    if !(0.0..=1.0).contains(&p) {
        return Err(RiskError::InvalidAlpha(p));
    }
    if values.is_empty() {
        return Err(RiskError::InsufficientData {
            required: 1,
            actual: 0,
        });
    }
    check_finite(values)?;

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    Ok(quantile_sorted(&sorted, p))
}

fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    let position = p * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;

    sorted[lower] + fraction * (sorted[upper] - sorted[lower])
}

/// Historical VaR: the negated `alpha`-quantile of the returns
pub fn historical_var(returns: &[f64], alpha: f64) -> Result<f64> {
    validate_tail_inputs(returns, alpha)?;
    Ok(-quantile(returns, alpha)?)
}

/// Historical CVaR: the negated mean of returns at or below the
/// `alpha`-quantile
pub fn historical_cvar(returns: &[f64], alpha: f64) -> Result<f64> {
    validate_tail_inputs(returns, alpha)?;

    let mut sorted = returns.to_vec();
    sorted.sort_by(f64::total_cmp);
    let threshold = quantile_sorted(&sorted, alpha);

    let tail: Vec<f64> = sorted.into_iter().take_while(|r| *r <= threshold).collect();
    if tail.is_empty() {
        return Err(RiskError::EmptyTail { alpha });
    }

    Ok(-mean(&tail)?)
}

/// Parametric VaR: `-(μ + σ·z_α)` with sample mean and sample standard
/// deviation, and `z_α` the `alpha`-quantile of the standard normal
pub fn parametric_var(returns: &[f64], alpha: f64) -> Result<f64> {
    validate_tail_inputs(returns, alpha)?;

    let mu = mean(returns)?;
    let sigma = sample_std(returns)?;
    let z = standard_normal_quantile(alpha)?;

    Ok(-(mu + sigma * z))
}

/// Inverse CDF of the standard normal distribution
pub fn standard_normal_quantile(p: f64) -> Result<f64> {
    let normal =
        Normal::new(0.0, 1.0).map_err(|e| RiskError::InvalidParameter(e.to_string()))?;
    Ok(normal.inverse_cdf(p))
}

fn validate_tail_inputs(returns: &[f64], alpha: f64) -> Result<()> {
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(RiskError::InvalidAlpha(alpha));
    }
    if returns.len() < 2 {
        return Err(RiskError::InsufficientData {
            required: 2,
            actual: returns.len(),
        });
    }
    check_finite(returns)
}

fn check_finite(values: &[f64]) -> Result<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(pos) => Err(RiskError::NonFiniteValue(pos)),
        None => Ok(()),
    }
}
