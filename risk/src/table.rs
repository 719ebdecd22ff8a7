//! Date-indexed tables and series
//!
//! Alignment contract:
//! - `PriceTable::align` joins per-instrument observations on date. A date
//!   that some instrument lacks becomes an absent cell, never a fill.
//! - `PriceTable::complete_rows` drops every date with any absent cell.
//! - `select` restricts and reorders columns; completeness is judged on the
//!   selected columns only, so select before dropping.

use crate::error::{Result, RiskError};
use chrono::NaiveDate;
use nalgebra::DMatrix;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::debug;

/// A date-indexed sequence of values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series<T = f64> {
    dates: Vec<NaiveDate>,
    values: Vec<T>,
}

impl<T> Series<T> {
    /// Create a series, checking that dates are strictly increasing and
    /// match the values one to one
    pub fn new(dates: Vec<NaiveDate>, values: Vec<T>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(RiskError::InvalidParameter(format!(
                "Series has {} dates but {} values",
                dates.len(),
                values.len()
            )));
        }
        validate_dates(&dates)?;
        Ok(Self { dates, values })
    }

    pub(crate) fn from_parts(dates: Vec<NaiveDate>, values: Vec<T>) -> Self {
        debug_assert_eq!(dates.len(), values.len());
        Self { dates, values }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over `(date, value)` pairs in date order
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, &T)> {
        self.dates.iter().copied().zip(self.values.iter())
    }

    /// Value on a given date, if present
    pub fn get(&self, date: NaiveDate) -> Option<&T> {
        self.dates
            .binary_search(&date)
            .ok()
            .map(|idx| &self.values[idx])
    }

    pub fn last(&self) -> Option<(NaiveDate, &T)> {
        self.dates.last().copied().zip(self.values.last())
    }
}

/// Adjusted close prices: dates × instruments, cells may be absent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceTable {
    dates: Vec<NaiveDate>,
    instruments: Vec<String>,
    rows: Vec<Vec<Option<f64>>>,
}

impl PriceTable {
    /// Create a price table from row-major cells
    ///
    /// Rejects unordered or duplicate dates, duplicate instruments, ragged
    /// rows and negative or non-finite prices. Zero prices are accepted here
    /// and rejected when returns are computed.
    pub fn new(
        dates: Vec<NaiveDate>,
        instruments: Vec<String>,
        rows: Vec<Vec<Option<f64>>>,
    ) -> Result<Self> {
        if dates.len() != rows.len() {
            return Err(RiskError::InvalidParameter(format!(
                "Price table has {} dates but {} rows",
                dates.len(),
                rows.len()
            )));
        }
        validate_dates(&dates)?;
        validate_instruments(&instruments)?;

        for (row_idx, row) in rows.iter().enumerate() {
            if row.len() != instruments.len() {
                return Err(RiskError::RaggedRow {
                    row: row_idx,
                    expected: instruments.len(),
                    actual: row.len(),
                });
            }

            for (col_idx, cell) in row.iter().enumerate() {
                if let Some(price) = *cell {
                    if !price.is_finite() || price < 0.0 {
                        return Err(RiskError::InvalidPrice {
                            instrument: instruments[col_idx].clone(),
                            date: dates[row_idx],
                            value: price,
                        });
                    }
                }
            }
        }

        Ok(Self {
            dates,
            instruments,
            rows,
        })
    }

    /// Join per-instrument `(date, price)` observations on date
    ///
    /// The resulting index is the union of all observed dates; an instrument
    /// without an observation on a date leaves that cell absent.
    pub fn align<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Vec<(NaiveDate, f64)>)>,
        S: Into<String>,
    {
        let mut instruments = Vec::new();
        let mut observations: Vec<BTreeMap<NaiveDate, f64>> = Vec::new();

        for (instrument, mut points) in columns {
            let instrument = instrument.into();
            points.sort_by_key(|(date, _)| *date);

            let mut by_date = BTreeMap::new();
            for pair in points.windows(2) {
                if pair[0].0 == pair[1].0 {
                    return Err(RiskError::UnorderedDates {
                        previous: pair[0].0,
                        current: pair[1].0,
                    });
                }
            }
            by_date.extend(points);

            instruments.push(instrument);
            observations.push(by_date);
        }

        let all_dates: BTreeSet<NaiveDate> = observations
            .iter()
            .flat_map(|column| column.keys().copied())
            .collect();
        let dates: Vec<NaiveDate> = all_dates.into_iter().collect();

        let rows = dates
            .iter()
            .map(|date| {
                observations
                    .iter()
                    .map(|column| column.get(date).copied())
                    .collect()
            })
            .collect();

        debug!(
            instruments = instruments.len(),
            dates = dates.len(),
            "Aligned price observations on date"
        );

        Self::new(dates, instruments, rows)
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn instruments(&self) -> &[String] {
        &self.instruments
    }

    pub fn rows(&self) -> &[Vec<Option<f64>>] {
        &self.rows
    }

    /// Number of dates
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Number of instruments
    pub fn width(&self) -> usize {
        self.instruments.len()
    }

    pub fn column_index(&self, instrument: &str) -> Option<usize> {
        self.instruments.iter().position(|i| i == instrument)
    }

    /// Price of an instrument on a date, if present
    pub fn price(&self, date: NaiveDate, instrument: &str) -> Option<f64> {
        let col = self.column_index(instrument)?;
        let row = self.dates.binary_search(&date).ok()?;
        self.rows[row][col]
    }

    /// Restrict to the given instruments, in the given order
    pub fn select<S: AsRef<str>>(&self, instruments: &[S]) -> Result<Self> {
        let indices = resolve_columns(&self.instruments, instruments)?;

        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&idx| row[idx]).collect())
            .collect();

        Ok(Self {
            dates: self.dates.clone(),
            instruments: indices
                .iter()
                .map(|&idx| self.instruments[idx].clone())
                .collect(),
            rows,
        })
    }

    /// Restrict to dates within an inclusive range; `None` leaves that side open
    pub fn between(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Self> {
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(RiskError::InvalidDateRange { start, end });
            }
        }

        let in_range = |date: &NaiveDate| {
            start.map_or(true, |s| *date >= s) && end.map_or(true, |e| *date <= e)
        };

        let (dates, rows) = self
            .dates
            .iter()
            .zip(self.rows.iter())
            .filter(|(date, _)| in_range(date))
            .map(|(date, row)| (*date, row.clone()))
            .unzip();

        Ok(Self {
            dates,
            instruments: self.instruments.clone(),
            rows,
        })
    }

    /// Drop every date where any instrument lacks a price
    pub fn complete_rows(&self) -> Self {
        let (dates, rows): (Vec<_>, Vec<_>) = self
            .dates
            .iter()
            .zip(self.rows.iter())
            .filter(|(_, row)| row.iter().all(Option::is_some))
            .map(|(date, row)| (*date, row.clone()))
            .unzip();

        let dropped = self.dates.len() - dates.len();
        if dropped > 0 {
            debug!(dropped, kept = dates.len(), "Dropped incomplete price rows");
        }

        Self {
            dates,
            instruments: self.instruments.clone(),
            rows,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.rows.iter().all(|row| row.iter().all(Option::is_some))
    }
}

/// Period-over-period simple returns: dates × instruments, every cell present
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnTable {
    dates: Vec<NaiveDate>,
    instruments: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl ReturnTable {
    /// Create a return table from row-major values
    pub fn new(
        dates: Vec<NaiveDate>,
        instruments: Vec<String>,
        rows: Vec<Vec<f64>>,
    ) -> Result<Self> {
        if dates.len() != rows.len() {
            return Err(RiskError::InvalidParameter(format!(
                "Return table has {} dates but {} rows",
                dates.len(),
                rows.len()
            )));
        }
        validate_dates(&dates)?;
        validate_instruments(&instruments)?;

        for (row_idx, row) in rows.iter().enumerate() {
            if row.len() != instruments.len() {
                return Err(RiskError::RaggedRow {
                    row: row_idx,
                    expected: instruments.len(),
                    actual: row.len(),
                });
            }
            if row.iter().any(|r| !r.is_finite()) {
                return Err(RiskError::NonFiniteValue(row_idx));
            }
        }

        Ok(Self {
            dates,
            instruments,
            rows,
        })
    }

    pub(crate) fn from_parts(
        dates: Vec<NaiveDate>,
        instruments: Vec<String>,
        rows: Vec<Vec<f64>>,
    ) -> Self {
        Self {
            dates,
            instruments,
            rows,
        }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn instruments(&self) -> &[String] {
        &self.instruments
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn width(&self) -> usize {
        self.instruments.len()
    }

    /// Returns of one instrument as a series
    pub fn column(&self, instrument: &str) -> Option<Series> {
        let col = self.instruments.iter().position(|i| i == instrument)?;
        let values = self.rows.iter().map(|row| row[col]).collect();
        Some(Series::from_parts(self.dates.clone(), values))
    }

    /// Restrict to the given instruments, in the given order
    pub fn select<S: AsRef<str>>(&self, instruments: &[S]) -> Result<Self> {
        let indices = resolve_columns(&self.instruments, instruments)?;

        Ok(Self {
            dates: self.dates.clone(),
            instruments: indices
                .iter()
                .map(|&idx| self.instruments[idx].clone())
                .collect(),
            rows: self
                .rows
                .iter()
                .map(|row| indices.iter().map(|&idx| row[idx]).collect())
                .collect(),
        })
    }

    /// Observations × instruments matrix
    pub fn to_matrix(&self) -> DMatrix<f64> {
        DMatrix::from_fn(self.len(), self.width(), |i, j| self.rows[i][j])
    }
}

fn validate_dates(dates: &[NaiveDate]) -> Result<()> {
    for pair in dates.windows(2) {
        if pair[1] <= pair[0] {
            return Err(RiskError::UnorderedDates {
                previous: pair[0],
                current: pair[1],
            });
        }
    }
    Ok(())
}

fn validate_instruments(instruments: &[String]) -> Result<()> {
    let mut seen = HashSet::new();
    for instrument in instruments {
        if !seen.insert(instrument.as_str()) {
            return Err(RiskError::DuplicateInstrument(instrument.clone()));
        }
    }
    Ok(())
}

fn resolve_columns<S: AsRef<str>>(available: &[String], requested: &[S]) -> Result<Vec<usize>> {
    if requested.is_empty() {
        return Err(RiskError::EmptySelection);
    }

    let mut seen = HashSet::new();
    requested
        .iter()
        .map(|name| {
            let name = name.as_ref();
            if !seen.insert(name) {
                return Err(RiskError::DuplicateInstrument(name.to_string()));
            }
            available
                .iter()
                .position(|i| i == name)
                .ok_or_else(|| RiskError::UnknownInstrument(name.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn sample_table() -> PriceTable {
        PriceTable::new(
            vec![d(2), d(3), d(4), d(5)],
            vec!["AAPL".to_string(), "MSFT".to_string(), "TLT".to_string()],
            vec![
                vec![Some(100.0), Some(200.0), Some(90.0)],
                vec![Some(101.0), None, Some(91.0)],
                vec![Some(102.0), Some(204.0), Some(92.0)],
                vec![Some(103.0), Some(206.0), None],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_align_joins_on_date() {
        let table = PriceTable::align(vec![
            ("AAPL", vec![(d(3), 101.0), (d(2), 100.0), (d(4), 102.0)]),
            ("MSFT", vec![(d(2), 200.0), (d(4), 204.0)]),
        ])
        .unwrap();

        assert_eq!(table.dates(), &[d(2), d(3), d(4)]);
        assert_eq!(table.instruments(), &["AAPL".to_string(), "MSFT".to_string()]);
        assert_eq!(table.price(d(3), "AAPL"), Some(101.0));
        assert_eq!(table.price(d(3), "MSFT"), None);
        assert!(!table.is_complete());
    }

    #[test]
    fn test_align_rejects_duplicate_dates() {
        let result = PriceTable::align(vec![("AAPL", vec![(d(2), 100.0), (d(2), 101.0)])]);
        assert!(matches!(result, Err(RiskError::UnorderedDates { .. })));
    }

    #[test]
    fn test_complete_rows_drops_any_missing() {
        let complete = sample_table().complete_rows();
        assert_eq!(complete.dates(), &[d(2), d(4)]);
        assert!(complete.is_complete());
    }

    #[test]
    fn test_select_judges_completeness_on_selection() {
        let selected = sample_table().select(&["TLT", "AAPL"]).unwrap();
        assert_eq!(selected.instruments(), &["TLT".to_string(), "AAPL".to_string()]);

        let complete = selected.complete_rows();
        assert_eq!(complete.dates(), &[d(2), d(3), d(4)]);
        assert_eq!(complete.rows()[1], vec![Some(91.0), Some(101.0)]);
    }

    #[test]
    fn test_select_errors() {
        let table = sample_table();
        let empty: [&str; 0] = [];
        assert_eq!(table.select(&empty), Err(RiskError::EmptySelection));
        assert_eq!(
            table.select(&["GOOGL"]),
            Err(RiskError::UnknownInstrument("GOOGL".to_string()))
        );
        assert_eq!(
            table.select(&["AAPL", "AAPL"]),
            Err(RiskError::DuplicateInstrument("AAPL".to_string()))
        );
    }

    #[test]
    fn test_between_is_inclusive() {
        let table = sample_table();
        let filtered = table.between(Some(d(3)), Some(d(4))).unwrap();
        assert_eq!(filtered.dates(), &[d(3), d(4)]);

        let open_start = table.between(None, Some(d(2))).unwrap();
        assert_eq!(open_start.dates(), &[d(2)]);

        assert!(matches!(
            table.between(Some(d(5)), Some(d(2))),
            Err(RiskError::InvalidDateRange { .. })
        ));
    }

    #[test]
    fn test_new_rejects_bad_input() {
        let unordered = PriceTable::new(
            vec![d(3), d(2)],
            vec!["AAPL".to_string()],
            vec![vec![Some(1.0)], vec![Some(1.0)]],
        );
        assert!(matches!(unordered, Err(RiskError::UnorderedDates { .. })));

        let negative = PriceTable::new(
            vec![d(2)],
            vec!["AAPL".to_string()],
            vec![vec![Some(-1.0)]],
        );
        assert!(matches!(negative, Err(RiskError::InvalidPrice { .. })));

        let ragged = PriceTable::new(
            vec![d(2)],
            vec!["AAPL".to_string(), "MSFT".to_string()],
            vec![vec![Some(1.0)]],
        );
        assert!(matches!(ragged, Err(RiskError::RaggedRow { row: 0, .. })));
    }

    #[test]
    fn test_series_lookup() {
        let series = Series::new(vec![d(2), d(3)], vec![0.01, -0.02]).unwrap();
        assert_eq!(series.get(d(3)), Some(&-0.02));
        assert_eq!(series.get(d(4)), None);
        assert_eq!(series.last(), Some((d(3), &-0.02)));

        assert!(Series::new(vec![d(2)], vec![0.01, 0.02]).is_err());
    }

    #[test]
    fn test_return_table_column_and_matrix() {
        let table = ReturnTable::new(
            vec![d(3), d(4)],
            vec!["A".to_string(), "B".to_string()],
            vec![vec![0.01, 0.02], vec![-0.01, 0.03]],
        )
        .unwrap();

        let b = table.column("B").unwrap();
        assert_eq!(b.values(), &[0.02, 0.03]);

        let matrix = table.to_matrix();
        assert_eq!(matrix.nrows(), 2);
        assert_eq!(matrix.ncols(), 2);
        assert_eq!(matrix[(1, 0)], -0.01);
    }
}
