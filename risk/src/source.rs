//! Price source abstraction
//!
//! The analyzer never fetches prices itself. Anything that can produce a
//! `PriceTable` for a set of instruments and a date range implements
//! `PriceSource`; caching, if any, belongs to the implementation.

use crate::error::Result;
use crate::table::PriceTable;
use chrono::NaiveDate;

/// Supplier of adjusted close prices
pub trait PriceSource {
    /// Prices for the given instruments, in the given order, restricted to
    /// an inclusive date range
    fn fetch_prices(
        &self,
        instruments: &[String],
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<PriceTable>;

    /// Source name for logs
    fn name(&self) -> &str {
        "unnamed"
    }
}

/// Serves prices from a table held in memory
#[derive(Debug, Clone)]
pub struct InMemoryPriceSource {
    table: PriceTable,
}

impl InMemoryPriceSource {
    pub fn new(table: PriceTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &PriceTable {
        &self.table
    }
}

impl PriceSource for InMemoryPriceSource {
    fn fetch_prices(
        &self,
        instruments: &[String],
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<PriceTable> {
        self.table.select(instruments)?.between(start, end)
    }

    fn name(&self) -> &str {
        "in-memory"
    }
}
