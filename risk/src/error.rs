//! Error types for portfolio risk analytics

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while building tables or computing risk metrics
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum RiskError {
    #[error("Shape mismatch: expected {expected} weights, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Weights sum to zero, normalization is undefined")]
    ZeroWeightSum,

    #[error("Invalid weight for {instrument}: {value}")]
    InvalidWeight { instrument: String, value: f64 },

    #[error("Negative weight for {instrument}: {value} (short positions not allowed)")]
    NegativeWeight { instrument: String, value: f64 },

    #[error("Zero price for {instrument} on {date}, return is undefined")]
    ZeroPrice { instrument: String, date: NaiveDate },

    #[error("Non-finite return for {instrument} on {date}, prices are out of range")]
    NonFiniteReturn { instrument: String, date: NaiveDate },

    #[error("Invalid price for {instrument} on {date}: {value}")]
    InvalidPrice {
        instrument: String,
        date: NaiveDate,
        value: f64,
    },

    #[error("Insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("No observations at or below the {alpha} quantile")]
    EmptyTail { alpha: f64 },

    #[error("Zero variance for {0}")]
    ZeroVariance(String),

    #[error("Non-finite value at position {0}")]
    NonFiniteValue(usize),

    #[error("Invalid tail probability: {0} (must be between 0 and 1)")]
    InvalidAlpha(f64),

    #[error("Invalid confidence level: {0} (must be between 0 and 1)")]
    InvalidConfidenceLevel(f64),

    #[error("Invalid rolling window: {0} (must be at least 2)")]
    InvalidWindow(usize),

    #[error("Invalid date range: {start} is after {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Dates must be strictly increasing: {current} follows {previous}")]
    UnorderedDates {
        previous: NaiveDate,
        current: NaiveDate,
    },

    #[error("Duplicate instrument: {0}")]
    DuplicateInstrument(String),

    #[error("Unknown instrument: {0}")]
    UnknownInstrument(String),

    #[error("No instruments selected")]
    EmptySelection,

    #[error("Row {row} has {actual} values, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Price source error: {0}")]
    PriceSource(String),
}

impl From<serde_yaml::Error> for RiskError {
    fn from(err: serde_yaml::Error) -> Self {
        RiskError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for RiskError {
    fn from(err: serde_json::Error) -> Self {
        RiskError::Config(err.to_string())
    }
}

/// Result type for risk analytics
pub type Result<T> = std::result::Result<T, RiskError>;
