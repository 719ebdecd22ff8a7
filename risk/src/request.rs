//! Analysis request definitions and configuration
//!
//! An `AnalysisRequest` is the parameter bundle the presentation layer sends
//! for one recomputation, typically loaded from YAML or JSON.

use crate::analytics::stress::StressScenario;
use crate::error::{Result, RiskError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Parameters for one portfolio risk analysis
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AnalysisRequest {
    /// Selected instrument identifiers, in weight order
    pub instruments: Vec<String>,

    /// One weight per instrument, not necessarily normalized
    pub weights: Vec<f64>,

    /// VaR confidence level (e.g., 0.90, 0.95, 0.99)
    #[serde(default = "default_confidence_level")]
    pub confidence_level: f64,

    /// Trailing window for rolling volatility
    #[serde(default = "default_rolling_window")]
    pub rolling_window: usize,

    /// Scale rolling volatility by √252
    #[serde(default = "default_annualize")]
    pub annualize: bool,

    /// First date to include (inclusive)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveDate>,

    /// Last date to include (inclusive)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDate>,

    /// Invested amount used to express losses in currency
    #[serde(default = "default_initial_investment")]
    pub initial_investment: f64,

    /// Accept negative weights
    #[serde(default)]
    pub allow_short: bool,

    /// Bins for the return distribution
    #[serde(default = "default_histogram_bins")]
    pub histogram_bins: usize,

    /// Shock scenarios to apply
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stress_scenarios: Vec<StressScenario>,
}

fn default_confidence_level() -> f64 {
    0.95
}

fn default_rolling_window() -> usize {
    30
}

fn default_annualize() -> bool {
    true
}

fn default_initial_investment() -> f64 {
    10_000.0
}

fn default_histogram_bins() -> usize {
    50
}

/// Trim and upper-case an instrument identifier
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

impl AnalysisRequest {
    /// Create a request with default settings
    pub fn new(instruments: Vec<String>, weights: Vec<f64>) -> Self {
        Self {
            instruments: instruments.iter().map(|s| normalize_symbol(s)).collect(),
            weights,
            confidence_level: default_confidence_level(),
            rolling_window: default_rolling_window(),
            annualize: default_annualize(),
            start: None,
            end: None,
            initial_investment: default_initial_investment(),
            allow_short: false,
            histogram_bins: default_histogram_bins(),
            stress_scenarios: Vec::new(),
        }
    }

    /// Load a request from a YAML string
    ///
    /// # Example
    ///
    /// ```
    /// use ag_portfolio_risk::AnalysisRequest;
    ///
    /// let yaml = r#"
    /// instruments: [aapl, " msft "]
    /// weights: [0.6, 0.4]
    /// confidence_level: 0.99
    /// "#;
    ///
    /// let request = AnalysisRequest::from_yaml(yaml).unwrap();
    /// assert_eq!(request.instruments, vec!["AAPL", "MSFT"]);
    /// assert_eq!(request.rolling_window, 30);
    /// ```
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let mut request: AnalysisRequest = serde_yaml::from_str(yaml)?;
        request.normalize_instruments()?;
        request.validate()?;
        Ok(request)
    }

    /// Load a request from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let mut request: AnalysisRequest = serde_json::from_str(json)?;
        request.normalize_instruments()?;
        request.validate()?;
        Ok(request)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Normalize instrument identifiers, including stress shock keys
    fn normalize_instruments(&mut self) -> Result<()> {
        for instrument in &mut self.instruments {
            *instrument = normalize_symbol(instrument);
        }

        for scenario in &mut self.stress_scenarios {
            let mut shocks = BTreeMap::new();
            for (instrument, shock) in std::mem::take(&mut scenario.shocks) {
                let symbol = normalize_symbol(&instrument);
                if shocks.insert(symbol.clone(), shock).is_some() {
                    return Err(RiskError::DuplicateInstrument(symbol));
                }
            }
            scenario.shocks = shocks;
        }

        Ok(())
    }

    /// Tail probability, `1 - confidence_level`
    pub fn alpha(&self) -> f64 {
        1.0 - self.confidence_level
    }

    /// Check every parameter before any computation runs
    pub fn validate(&self) -> Result<()> {
        if self.instruments.is_empty() {
            return Err(RiskError::EmptySelection);
        }

        let mut seen = HashSet::new();
        for instrument in &self.instruments {
            if instrument.is_empty() {
                return Err(RiskError::InvalidParameter(
                    "Instrument identifier is empty".to_string(),
                ));
            }
            if !seen.insert(instrument.as_str()) {
                return Err(RiskError::DuplicateInstrument(instrument.clone()));
            }
        }

        if self.weights.len() != self.instruments.len() {
            return Err(RiskError::ShapeMismatch {
                expected: self.instruments.len(),
                actual: self.weights.len(),
            });
        }

        for (instrument, &weight) in self.instruments.iter().zip(&self.weights) {
            if !weight.is_finite() {
                return Err(RiskError::InvalidWeight {
                    instrument: instrument.clone(),
                    value: weight,
                });
            }
            if weight < 0.0 && !self.allow_short {
                return Err(RiskError::NegativeWeight {
                    instrument: instrument.clone(),
                    value: weight,
                });
            }
        }

        let total: f64 = self.weights.iter().sum();
        if total.abs() < crate::analytics::portfolio::WEIGHT_SUM_TOLERANCE {
            return Err(RiskError::ZeroWeightSum);
        }

        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(RiskError::InvalidConfidenceLevel(self.confidence_level));
        }

        if self.rolling_window < 2 {
            return Err(RiskError::InvalidWindow(self.rolling_window));
        }

        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start > end {
                return Err(RiskError::InvalidDateRange { start, end });
            }
        }

        if !self.initial_investment.is_finite() || self.initial_investment < 0.0 {
            return Err(RiskError::InvalidParameter(format!(
                "Initial investment must be finite and non-negative, got {}",
                self.initial_investment
            )));
        }

        if self.histogram_bins == 0 {
            return Err(RiskError::InvalidParameter(
                "Histogram needs at least one bin".to_string(),
            ));
        }

        for scenario in &self.stress_scenarios {
            scenario.validate()?;

            if let Some(unknown) = scenario.shocks.keys().find(|k| !seen.contains(k.as_str())) {
                return Err(RiskError::UnknownInstrument(unknown.clone()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_deserialization_yaml() {
        let yaml = r#"
instruments: [AAPL, MSFT, GOOGL]
weights: [0.5, 0.3, 0.2]
confidence_level: 0.99
rolling_window: 60
annualize: false
start: 2020-01-01
end: 2024-12-31
initial_investment: 250000
stress_scenarios:
  - name: Equity crash
    default_shock: -0.30
"#;

        let request = AnalysisRequest::from_yaml(yaml).unwrap();
        assert_eq!(request.instruments.len(), 3);
        assert_eq!(request.confidence_level, 0.99);
        assert_eq!(request.rolling_window, 60);
        assert!(!request.annualize);
        assert_eq!(request.start, NaiveDate::from_ymd_opt(2020, 1, 1));
        assert_eq!(request.initial_investment, 250_000.0);
        assert_eq!(request.stress_scenarios[0].default_shock, -0.30);
        assert!((request.alpha() - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_request_defaults_json() {
        let json = r#"{ "instruments": ["spy"], "weights": [1.0] }"#;

        let request = AnalysisRequest::from_json(json).unwrap();
        assert_eq!(request.instruments, vec!["SPY".to_string()]);
        assert_eq!(request.confidence_level, 0.95);
        assert_eq!(request.rolling_window, 30);
        assert!(request.annualize);
        assert_eq!(request.initial_investment, 10_000.0);
        assert_eq!(request.histogram_bins, 50);
        assert!(!request.allow_short);
        assert!(request.start.is_none());
    }

    #[test]
    fn test_request_serialization_roundtrip() {
        let request = AnalysisRequest::new(vec![" tlt".to_string()], vec![1.0]);
        let yaml = request.to_yaml().unwrap();
        assert!(yaml.contains("TLT"));
        assert_eq!(AnalysisRequest::from_yaml(&yaml).unwrap(), request);
    }

    #[test]
    fn test_validation_errors() {
        let mut request = AnalysisRequest::new(vec!["A".into(), "B".into()], vec![1.0]);
        assert!(matches!(
            request.validate(),
            Err(RiskError::ShapeMismatch { expected: 2, actual: 1 })
        ));

        request.weights = vec![1.0, -1.0];
        assert!(matches!(request.validate(), Err(RiskError::NegativeWeight { .. })));

        request.allow_short = true;
        assert_eq!(request.validate(), Err(RiskError::ZeroWeightSum));

        request.weights = vec![1.5, -0.5];
        assert!(request.validate().is_ok());

        request.confidence_level = 1.0;
        assert_eq!(
            request.validate(),
            Err(RiskError::InvalidConfidenceLevel(1.0))
        );

        request.confidence_level = 0.95;
        request.rolling_window = 1;
        assert_eq!(request.validate(), Err(RiskError::InvalidWindow(1)));
    }

    #[test]
    fn test_duplicate_after_normalization() {
        let yaml = r#"
instruments: [aapl, AAPL]
weights: [1, 1]
"#;
        assert_eq!(
            AnalysisRequest::from_yaml(yaml),
            Err(RiskError::DuplicateInstrument("AAPL".to_string()))
        );
    }

    #[test]
    fn test_shock_keys_normalized_like_instruments() {
        let yaml = r#"
instruments: [aapl, tlt]
weights: [1, 1]
stress_scenarios:
  - name: Rates shock
    default_shock: 0.0
    shocks:
      " tlt": -0.20
"#;
        let request = AnalysisRequest::from_yaml(yaml).unwrap();
        let scenario = &request.stress_scenarios[0];
        assert_eq!(scenario.shock_for("TLT"), -0.20);

        let result = crate::analytics::apply_scenario(
            &request.instruments,
            &request.weights,
            scenario,
            1.0,
        )
        .unwrap();
        assert!((result.portfolio_return + 0.10).abs() < 1e-12);
    }

    #[test]
    fn test_shock_for_unselected_instrument() {
        let yaml = r#"
instruments: [AAPL]
weights: [1]
stress_scenarios:
  - name: Typo
    shocks:
      APPL: -0.20
"#;
        assert_eq!(
            AnalysisRequest::from_yaml(yaml),
            Err(RiskError::UnknownInstrument("APPL".to_string()))
        );
    }

    #[test]
    fn test_shock_keys_colliding_after_normalization() {
        let yaml = r#"
instruments: [TLT]
weights: [1]
stress_scenarios:
  - name: Rates shock
    shocks:
      tlt: -0.20
      TLT: -0.10
"#;
        assert_eq!(
            AnalysisRequest::from_yaml(yaml),
            Err(RiskError::DuplicateInstrument("TLT".to_string()))
        );
    }

    #[test]
    fn test_invalid_date_range() {
        let yaml = r#"
instruments: [SPY]
weights: [1]
start: 2024-06-01
end: 2024-01-01
"#;
        assert!(matches!(
            AnalysisRequest::from_yaml(yaml),
            Err(RiskError::InvalidDateRange { .. })
        ));
    }

    #[test]
    fn test_malformed_yaml() {
        assert!(matches!(
            AnalysisRequest::from_yaml("instruments: [SPY"),
            Err(RiskError::Config(_))
        ));
    }
}
