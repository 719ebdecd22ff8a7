//! Weighted portfolio returns
//!
//! Weights are normalized by their sum before use, so `[1, 1]`, `[0.5, 0.5]`
//! and `[50, 50]` describe the same portfolio. Whether negative weights are
//! acceptable is the caller's decision; only a zero or non-finite sum is
//! rejected here.

use crate::error::{Result, RiskError};
use crate::table::{ReturnTable, Series};
use nalgebra::DVector;

/// Weight sums with a smaller magnitude are treated as zero
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-12;

/// Divide each weight by the sum of all weights
pub fn normalize_weights(weights: &[f64]) -> Result<Vec<f64>> {
    if weights.is_empty() {
        return Err(RiskError::EmptySelection);
    }

    if let Some(pos) = weights.iter().position(|w| !w.is_finite()) {
        return Err(RiskError::InvalidWeight {
            instrument: format!("position {}", pos),
            value: weights[pos],
        });
    }

    let total: f64 = weights.iter().sum();
    if !total.is_finite() || total.abs() < WEIGHT_SUM_TOLERANCE {
        return Err(RiskError::ZeroWeightSum);
    }

    Ok(weights.iter().map(|w| w / total).collect())
}

/// Combine a return table and a weight vector into portfolio returns
///
/// Weights are matched to the table's columns by position; select the table
/// in weight order first. For each date the result is the dot product of
/// that date's returns with the normalized weights.
pub fn portfolio_returns(returns: &ReturnTable, weights: &[f64]) -> Result<Series> {
    if weights.len() != returns.width() {
        return Err(RiskError::ShapeMismatch {
            expected: returns.width(),
            actual: weights.len(),
        });
    }

    for (instrument, &weight) in returns.instruments().iter().zip(weights) {
        if !weight.is_finite() {
            return Err(RiskError::InvalidWeight {
                instrument: instrument.clone(),
                value: weight,
            });
        }
    }

    let normalized = normalize_weights(weights)?;
    let w = DVector::from_vec(normalized);
    let portfolio = returns.to_matrix() * w;

    Ok(Series::from_parts(
        returns.dates().to_vec(),
        portfolio.iter().copied().collect(),
    ))
}
