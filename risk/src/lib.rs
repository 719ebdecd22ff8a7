//! # ag-portfolio-risk: Portfolio Risk Analytics
//!
//! This library turns adjusted close prices for a weighted selection of
//! instruments into a portfolio risk report: returns, cumulative growth,
//! drawdowns, rolling volatility, tail risk and correlations.
//!
//! ## Core Components
//!
//! - **PriceTable / ReturnTable**: Date-indexed, instrument-keyed data
//! - **analytics**: Pure computations over those tables
//! - **AnalysisRequest**: YAML/JSON parameters for one recomputation
//! - **RiskAnalyzer**: Runs the whole pipeline and builds a `RiskReport`
//! - **PriceSource**: Trait for whatever supplies prices
//!
//! ## Example Usage
//!
//! ```rust
//! use ag_portfolio_risk::{AnalysisRequest, PriceTable, RiskAnalyzer};
//! use chrono::NaiveDate;
//!
//! let d = |day| NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
//! let prices = PriceTable::align(vec![
//!     ("SPY", vec![(d(1), 100.0), (d(4), 101.0), (d(5), 99.5), (d(6), 100.5), (d(7), 102.0)]),
//!     ("TLT", vec![(d(1), 90.0), (d(4), 89.0), (d(5), 90.2), (d(6), 90.1), (d(7), 89.4)]),
//! ])
//! .unwrap();
//!
//! let yaml = r#"
//! instruments: [spy, tlt]
//! weights: [60, 40]
//! rolling_window: 3
//! "#;
//! let request = AnalysisRequest::from_yaml(yaml).unwrap();
//!
//! let report = RiskAnalyzer::default().analyze(&prices, &request).unwrap();
//! assert_eq!(report.weights, vec![0.6, 0.4]);
//! assert_eq!(report.portfolio_returns.len(), 4);
//! assert!(report.tail_risk.historical_var.loss > 0.0);
//! ```

pub mod analytics;
pub mod error;
pub mod request;
pub mod source;
pub mod table;

mod engine;

// Re-export main types
pub use engine::{AnalyzerConfig, RiskAnalyzer, RiskReport, TailRisk, UnavailableMetric};
pub use error::{Result, RiskError};
pub use request::{normalize_symbol, AnalysisRequest};
pub use source::{InMemoryPriceSource, PriceSource};
pub use table::{PriceTable, ReturnTable, Series};

// Initialize tracing
pub fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    // A subscriber may already be installed by the host application
    let _ = tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .try_init();
}
