//! Simple returns from adjusted close prices

use crate::error::{Result, RiskError};
use crate::table::{PriceTable, ReturnTable};

/// Convert a price table into period-over-period simple returns
///
/// Rows with any missing price are dropped first, then each cell becomes
/// `price[t] / price[t-1] - 1` over consecutive complete rows. The first
/// complete date has no prior price and is dropped.
pub fn simple_returns(prices: &PriceTable) -> Result<ReturnTable> {
    let complete = prices.complete_rows();

    if complete.len() < 2 {
        return Err(RiskError::InsufficientData {
            required: 2,
            actual: complete.len(),
        });
    }

    // Every cell of a complete row is present
    let levels: Vec<Vec<f64>> = complete
        .rows()
        .iter()
        .map(|row| row.iter().flatten().copied().collect())
        .collect();

    let mut rows = Vec::with_capacity(levels.len() - 1);
    for (t, pair) in levels.windows(2).enumerate() {
        let (previous, current) = (&pair[0], &pair[1]);

        let mut row = Vec::with_capacity(complete.width());
        for (col, (&prev, &curr)) in previous.iter().zip(current.iter()).enumerate() {
            if prev == 0.0 {
                return Err(RiskError::ZeroPrice {
                    instrument: complete.instruments()[col].clone(),
                    date: complete.dates()[t],
                });
            }

            let r = curr / prev - 1.0;
            if !r.is_finite() {
                return Err(RiskError::NonFiniteReturn {
                    instrument: complete.instruments()[col].clone(),
                    date: complete.dates()[t + 1],
                });
            }
            row.push(r);
        }
        rows.push(row);
    }

    Ok(ReturnTable::from_parts(
        complete.dates()[1..].to_vec(),
        complete.instruments().to_vec(),
        rows,
    ))
}
