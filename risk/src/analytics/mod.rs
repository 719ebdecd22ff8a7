//! # Portfolio Analytics
//!
//! Pure functions from price and return data to risk figures. Nothing here
//! holds state, logs, or caches; every call recomputes from its inputs.
//!
//! ## Modules
//!
//! - `returns`: simple returns from a price table
//! - `portfolio`: weight normalization and weighted portfolio returns
//! - `path`: cumulative returns, drawdown, maximum drawdown
//! - `dispersion`: sample moments and rolling volatility
//! - `tail`: historical VaR, historical CVaR, parametric VaR
//! - `correlation`: Pearson correlation matrix
//! - `summary`: mean, volatility, Sharpe-style ratio, histogram
//! - `stress`: instantaneous shock scenarios

pub mod correlation;
pub mod dispersion;
pub mod path;
pub mod portfolio;
pub mod returns;
pub mod stress;
pub mod summary;
pub mod tail;

pub use correlation::{correlation, CorrelationMatrix};
pub use dispersion::{
    annualize_volatility, mean, rolling_vol, sample_std, TRADING_DAYS_PER_YEAR,
};
pub use path::{cumulative_returns, drawdown, max_drawdown};
pub use portfolio::{normalize_weights, portfolio_returns};
pub use returns::simple_returns;
pub use stress::{apply_scenario, StressContribution, StressResult, StressScenario};
pub use summary::{histogram, summarize, Histogram, ReturnSummary};
pub use tail::{
    alpha_from_confidence, historical_cvar, historical_var, parametric_var, quantile,
    value_at_risk, VarMethod, VarResult,
};
