//! Example: Analyzing a portfolio from a request preset
//!
//! This example demonstrates how to:
//! 1. Load an analysis request from YAML
//! 2. Build a price table from per-instrument observations
//! 3. Run the analyzer through a price source
//! 4. Read the report and export it as JSON
//!
//! Run with: cargo run --example analyze_portfolio [-- presets/hedged.yaml]

use ag_portfolio_risk::{AnalysisRequest, InMemoryPriceSource, PriceTable, RiskAnalyzer};
use chrono::{Duration, NaiveDate};
use std::env;
use std::fs;

/// Synthetic daily closes for a demo market
fn demo_prices() -> Result<PriceTable, Box<dyn std::error::Error>> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("invalid start date")?;
    let profiles = [
        ("AAPL", 185.0, 0.0009, 0.017),
        ("MSFT", 375.0, 0.0007, 0.014),
        ("SPY", 472.0, 0.0005, 0.010),
        ("TLT", 98.0, -0.0001, 0.006),
    ];

    let columns = profiles
        .iter()
        .enumerate()
        .map(|(k, (symbol, base, drift, amplitude))| {
            let mut price = *base;
            let points = (0..250)
                .map(|i| {
                    if i > 0 {
                        price *= 1.0 + drift + amplitude * ((i * (k + 2)) as f64 * 0.37).sin();
                    }
                    (start + Duration::days(i as i64), price)
                })
                .collect::<Vec<_>>();
            (*symbol, points)
        })
        .collect::<Vec<_>>();

    Ok(PriceTable::align(columns)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    ag_portfolio_risk::init_tracing();

    println!("=== Portfolio Risk Analysis Example ===\n");

    // 1. Load request
    let default_preset = concat!(env!("CARGO_MANIFEST_DIR"), "/presets/balanced.yaml");
    let path = env::args()
        .nth(1)
        .unwrap_or_else(|| default_preset.to_string());
    println!("1. Loading request from {}", path);
    let request = AnalysisRequest::from_yaml(&fs::read_to_string(&path)?)?;
    println!("   Instruments: {:?}", request.instruments);
    println!("   Weights: {:?}\n", request.weights);

    // 2. Prices
    println!("2. Building demo price table...");
    let source = InMemoryPriceSource::new(demo_prices()?);
    println!(
        "   {} dates x {} instruments\n",
        source.table().len(),
        source.table().width()
    );

    // 3. Analyze
    println!("3. Running analysis...");
    let analyzer = RiskAnalyzer::default();
    let report = analyzer.analyze_source(&source, &request)?;

    if let Some(summary) = &report.summary {
        println!("   Observations: {}", summary.observations);
        println!("   Mean return: {:.4}%", summary.mean_return * 100.0);
        println!(
            "   Volatility: {:.4}% (annualized {:.2}%)",
            summary.volatility * 100.0,
            summary.annualized_volatility * 100.0
        );
        println!("   Sharpe ratio: {:.3}", summary.sharpe_ratio);
    }
    println!("   Max drawdown: {:.2}%\n", report.max_drawdown * 100.0);

    let tail = &report.tail_risk;
    println!("   Tail risk at {:.0}% confidence:", tail.confidence_level * 100.0);
    for result in [&tail.historical_var, &tail.historical_cvar, &tail.parametric_var] {
        println!(
            "     {:?}: {:.3}% (${:.2})",
            result.method,
            result.loss * 100.0,
            result.amount
        );
    }

    for stress in &report.stress_results {
        println!(
            "   Scenario '{}': {:+.2}% (${:+.2})",
            stress.scenario_name,
            stress.portfolio_return * 100.0,
            stress.value_change
        );
    }
    println!();

    // 4. Export
    println!("4. Correlation matrix:");
    if let Some(correlation) = &report.correlation {
        for (instrument, row) in correlation.instruments().iter().zip(correlation.to_rows()) {
            let cells: Vec<String> = row.iter().map(|c| format!("{:+.3}", c)).collect();
            println!("   {:<6} {}", instrument, cells.join("  "));
        }
    }

    for missing in &report.unavailable {
        println!("   {} unavailable: {}", missing.metric, missing.error);
    }

    let json = report.to_json()?;
    println!("\n   JSON report: {} bytes", json.len());

    println!("\n=== Example Complete ===");
    Ok(())
}
