//! Pairwise Pearson correlation of instrument returns

use crate::error::{Result, RiskError};
use crate::table::ReturnTable;
use nalgebra::DMatrix;
use serde::Serialize;

/// Demeaned columns with a smaller Euclidean norm are treated as constant
const ZERO_VARIANCE_TOLERANCE: f64 = 1e-12;

/// Symmetric instrument × instrument correlation matrix
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    instruments: Vec<String>,
    matrix: DMatrix<f64>,
}

impl CorrelationMatrix {
    /// Instrument labels, in row and column order
    pub fn instruments(&self) -> &[String] {
        &self.instruments
    }

    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    /// Number of instruments
    pub fn size(&self) -> usize {
        self.instruments.len()
    }

    /// Correlation between two instruments by identifier
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.instruments.iter().position(|x| x == a)?;
        let j = self.instruments.iter().position(|x| x == b)?;
        Some(self.matrix[(i, j)])
    }

    /// Row-major copy of the matrix
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.matrix
            .row_iter()
            .map(|row| row.iter().copied().collect())
            .collect()
    }
}

/// Pearson correlation between every pair of instruments over their common
/// dates
///
/// Only the upper triangle is computed and mirrored, so the result is exactly
/// symmetric; the diagonal is exactly 1 and off-diagonal entries are clamped
/// to [-1, 1]. A single instrument yields the 1×1 matrix `[1]`.
pub fn correlation(returns: &ReturnTable) -> Result<CorrelationMatrix> {
    if returns.width() == 0 {
        return Err(RiskError::EmptySelection);
    }
    if returns.len() < 2 {
        return Err(RiskError::InsufficientData {
            required: 2,
            actual: returns.len(),
        });
    }

    // Demeaned columns and their Euclidean norms
    let mut centered = returns.to_matrix();
    let n = centered.ncols();
    let mut norms = Vec::with_capacity(n);
    for (j, instrument) in returns.instruments().iter().enumerate() {
        let mu = centered.column(j).mean();
        centered.column_mut(j).add_scalar_mut(-mu);

        let norm = centered.column(j).norm();
        if norm < ZERO_VARIANCE_TOLERANCE {
            return Err(RiskError::ZeroVariance(instrument.clone()));
        }
        norms.push(norm);
    }

    let mut matrix = DMatrix::identity(n, n);
    for i in 0..n {
        for j in (i + 1)..n {
            let rho = centered.column(i).dot(&centered.column(j)) / (norms[i] * norms[j]);
            let rho = rho.clamp(-1.0, 1.0);
            matrix[(i, j)] = rho;
            matrix[(j, i)] = rho;
        }
    }

    Ok(CorrelationMatrix {
        instruments: returns.instruments().to_vec(),
        matrix,
    })
}
