//! Risk analysis engine
//!
//! `RiskAnalyzer` runs the whole pipeline for one `AnalysisRequest`:
//! select and filter prices, compute returns, aggregate the portfolio, then
//! derive every metric. Each call is an independent recomputation.

use crate::analytics::{
    apply_scenario, correlation, cumulative_returns, drawdown, histogram, max_drawdown,
    normalize_weights, portfolio_returns, rolling_vol, simple_returns, summarize, value_at_risk,
    CorrelationMatrix, Histogram, ReturnSummary, StressResult, VarMethod, VarResult,
};
use crate::error::{Result, RiskError};
use crate::request::AnalysisRequest;
use crate::source::PriceSource;
use crate::table::{PriceTable, Series};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Analyzer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Minimum number of portfolio return observations required
    pub min_observations: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            min_observations: 2,
        }
    }
}

/// VaR, CVaR and parametric VaR at one confidence level
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TailRisk {
    pub confidence_level: f64,
    pub historical_var: VarResult,
    pub historical_cvar: VarResult,
    pub parametric_var: VarResult,
}

/// A metric left out of a report because the selected data makes it
/// undefined
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnavailableMetric {
    pub metric: String,
    pub error: RiskError,
}

/// Everything the presentation layer needs for one recomputation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskReport {
    /// Selected instruments, in weight order
    pub instruments: Vec<String>,

    /// Normalized weights
    pub weights: Vec<f64>,

    /// First and last return dates used
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,

    pub portfolio_returns: Series,
    pub cumulative_returns: Series,
    pub drawdown: Series,

    /// Most negative drawdown
    pub max_drawdown: f64,

    pub rolling_window: usize,
    pub annualized: bool,
    pub rolling_volatility: Series<Option<f64>>,

    pub tail_risk: TailRisk,

    /// `None` when an instrument's returns never vary
    pub correlation: Option<CorrelationMatrix>,

    /// `None` when the portfolio returns never vary
    pub summary: Option<ReturnSummary>,

    pub histogram: Histogram,
    pub stress_results: Vec<StressResult>,

    /// Metrics withheld and the reason for each
    pub unavailable: Vec<UnavailableMetric>,

    /// Timestamp of calculation
    pub generated_at: DateTime<Utc>,
}

impl RiskReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Portfolio risk analyzer
#[derive(Debug, Clone, Default)]
pub struct RiskAnalyzer {
    config: AnalyzerConfig,
}

impl RiskAnalyzer {
    /// Create a new analyzer with configuration
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Fetch prices from a source, then analyze them
    pub fn analyze_source(
        &self,
        source: &dyn PriceSource,
        request: &AnalysisRequest,
    ) -> Result<RiskReport> {
        request.validate()?;

        debug!(source = source.name(), "Fetching prices");
        let prices = source.fetch_prices(&request.instruments, request.start, request.end)?;

        self.analyze(&prices, request)
    }

    /// Run the full analysis for one request against a price table
    ///
    /// # Example
    ///
    /// ```
    /// use ag_portfolio_risk::{AnalysisRequest, PriceTable, RiskAnalyzer};
    /// use chrono::{Duration, NaiveDate};
    ///
    /// let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    /// let day = |i: i64| start + Duration::days(i);
    /// let prices = PriceTable::align(vec![
    ///     ("AAPL", (0..10).map(|i| (day(i), 100.0 + (i % 3) as f64)).collect()),
    ///     ("TLT", (0..10).map(|i| (day(i), 90.0 + (i % 4) as f64)).collect()),
    /// ])
    /// .unwrap();
    ///
    /// let mut request = AnalysisRequest::new(vec!["AAPL".into(), "TLT".into()], vec![0.6, 0.4]);
    /// request.rolling_window = 5;
    ///
    /// let report = RiskAnalyzer::default().analyze(&prices, &request).unwrap();
    /// assert_eq!(report.portfolio_returns.len(), 9);
    /// assert!(report.max_drawdown <= 0.0);
    /// assert!(report.tail_risk.historical_cvar.loss >= report.tail_risk.historical_var.loss);
    /// ```
    pub fn analyze(&self, prices: &PriceTable, request: &AnalysisRequest) -> Result<RiskReport> {
        request.validate()?;

        info!(
            instruments = ?request.instruments,
            confidence_level = request.confidence_level,
            "Running portfolio risk analysis"
        );

        // Align on the selection first so completeness is judged on it alone
        let selected = prices
            .select(&request.instruments)?
            .between(request.start, request.end)?;
        let complete = selected.complete_rows();

        if complete.len() < selected.len() {
            warn!(
                excluded = selected.len() - complete.len(),
                kept = complete.len(),
                "Excluded dates with missing prices"
            );
        }

        let returns = simple_returns(&complete)?;
        debug!(observations = returns.len(), "Computed simple returns");

        let port_ret = portfolio_returns(&returns, &request.weights)?;
        if port_ret.len() < self.config.min_observations {
            return Err(RiskError::InsufficientData {
                required: self.config.min_observations,
                actual: port_ret.len(),
            });
        }

        let weights = normalize_weights(&request.weights)?;
        let cumulative = cumulative_returns(&port_ret);
        let drawdown_path = drawdown(&port_ret);
        let max_dd = max_drawdown(&port_ret)?;
        let rolling = rolling_vol(&port_ret, request.rolling_window, request.annualize)?;
        debug!(window = request.rolling_window, "Computed path and volatility metrics");

        let tail_risk = self.tail_risk(port_ret.values(), request)?;

        let mut unavailable = Vec::new();
        let correlation =
            degenerate_to_none("correlation", correlation(&returns), &mut unavailable)?;
        let summary =
            degenerate_to_none("summary", summarize(port_ret.values()), &mut unavailable)?;
        let histogram = histogram(port_ret.values(), request.histogram_bins)?;

        let stress_results = request
            .stress_scenarios
            .iter()
            .map(|scenario| {
                apply_scenario(
                    &request.instruments,
                    &request.weights,
                    scenario,
                    request.initial_investment,
                )
            })
            .collect::<Result<Vec<_>>>()?;

        info!(
            observations = port_ret.len(),
            max_drawdown = max_dd,
            historical_var = tail_risk.historical_var.loss,
            historical_cvar = tail_risk.historical_cvar.loss,
            "Portfolio risk analysis complete"
        );

        Ok(RiskReport {
            instruments: request.instruments.clone(),
            weights,
            start: port_ret.dates().first().copied(),
            end: port_ret.dates().last().copied(),
            portfolio_returns: port_ret,
            cumulative_returns: cumulative,
            drawdown: drawdown_path,
            max_drawdown: max_dd,
            rolling_window: request.rolling_window,
            annualized: request.annualize,
            rolling_volatility: rolling,
            tail_risk,
            correlation,
            summary,
            histogram,
            stress_results,
            unavailable,
            generated_at: Utc::now(),
        })
    }

    fn tail_risk(&self, returns: &[f64], request: &AnalysisRequest) -> Result<TailRisk> {
        let measure = |method| {
            value_at_risk(
                returns,
                request.confidence_level,
                request.initial_investment,
                method,
            )
        };

        Ok(TailRisk {
            confidence_level: request.confidence_level,
            historical_var: measure(VarMethod::Historical)?,
            historical_cvar: measure(VarMethod::ConditionalHistorical)?,
            parametric_var: measure(VarMethod::Parametric)?,
        })
    }
}

/// Record a zero-variance failure and leave the metric out; any other error
/// still fails the analysis
fn degenerate_to_none<T>(
    metric: &str,
    result: Result<T>,
    unavailable: &mut Vec<UnavailableMetric>,
) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(error @ RiskError::ZeroVariance(_)) => {
            warn!(metric, %error, "Metric unavailable for this selection");
            unavailable.push(UnavailableMetric {
                metric: metric.to_string(),
                error,
            });
            Ok(None)
        }
        Err(error) => Err(error),
    }
}
