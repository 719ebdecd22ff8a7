//! Instantaneous shock scenarios
//!
//! A scenario moves every instrument's price by a fixed fraction at once.
//! The portfolio impact is the weight-averaged shock, using normalized
//! weights, and the currency impact scales that by the invested amount.

use crate::analytics::portfolio::normalize_weights;
use crate::error::{Result, RiskError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stress scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressScenario {
    /// Scenario name
    pub name: String,

    /// Shock applied to instruments without an explicit entry
    /// (e.g., -0.20 for -20%)
    #[serde(default)]
    pub default_shock: f64,

    /// Per-instrument shocks
    #[serde(default)]
    pub shocks: BTreeMap<String, f64>,
}

impl StressScenario {
    /// The same shock for every instrument
    pub fn uniform(shock: f64) -> Self {
        Self {
            name: format!("Uniform {:+.1}%", shock * 100.0),
            default_shock: shock,
            shocks: BTreeMap::new(),
        }
    }

    /// Override the shock for one instrument
    pub fn with_shock(mut self, instrument: impl Into<String>, shock: f64) -> Self {
        self.shocks.insert(instrument.into(), shock);
        self
    }

    pub fn shock_for(&self, instrument: &str) -> f64 {
        self.shocks
            .get(instrument)
            .copied()
            .unwrap_or(self.default_shock)
    }

    /// Shocks must be finite and cannot take a price below zero
    pub fn validate(&self) -> Result<()> {
        let all = std::iter::once(("default", self.default_shock))
            .chain(self.shocks.iter().map(|(k, v)| (k.as_str(), *v)));

        for (instrument, shock) in all {
            if !shock.is_finite() || shock < -1.0 {
                return Err(RiskError::InvalidParameter(format!(
                    "Scenario '{}': shock {} for {} must be finite and at least -1",
                    self.name, shock, instrument
                )));
            }
        }
        Ok(())
    }
}

/// One instrument's share of a scenario's impact
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StressContribution {
    pub instrument: String,

    /// Normalized weight
    pub weight: f64,

    /// Shock applied to this instrument
    pub shock: f64,

    /// weight × shock
    pub contribution: f64,
}

/// Result of applying one scenario
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StressResult {
    /// Scenario name
    pub scenario_name: String,

    /// Portfolio return under the scenario
    pub portfolio_return: f64,

    /// Portfolio return × invested amount
    pub value_change: f64,

    /// Per-instrument contributions, in selection order
    pub contributions: Vec<StressContribution>,

    /// Instrument with the most negative contribution
    pub worst_instrument: Option<String>,
}

/// Apply a scenario to a weighted selection of instruments
pub fn apply_scenario(
    instruments: &[String],
    weights: &[f64],
    scenario: &StressScenario,
    investment: f64,
) -> Result<StressResult> {
    if weights.len() != instruments.len() {
        return Err(RiskError::ShapeMismatch {
            expected: instruments.len(),
            actual: weights.len(),
        });
    }
    scenario.validate()?;

    let normalized = normalize_weights(weights)?;

    let contributions: Vec<StressContribution> = instruments
        .iter()
        .zip(normalized)
        .map(|(instrument, weight)| {
            let shock = scenario.shock_for(instrument);
            StressContribution {
                instrument: instrument.clone(),
                weight,
                shock,
                contribution: weight * shock,
            }
        })
        .collect();

    let portfolio_return: f64 = contributions.iter().map(|c| c.contribution).sum();

    let worst_instrument = contributions
        .iter()
        .filter(|c| c.contribution < 0.0)
        .min_by(|a, b| a.contribution.total_cmp(&b.contribution))
        .map(|c| c.instrument.clone());

    Ok(StressResult {
        scenario_name: scenario.name.clone(),
        portfolio_return,
        value_change: portfolio_return * investment,
        contributions,
        worst_instrument,
    })
}
