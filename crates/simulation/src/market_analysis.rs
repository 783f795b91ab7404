//! Regime classification of a price series.
//!
//! The annualized drift of log returns is compared with their annualized
//! volatility. A strong signal either way is a trending market; anything
//! inside the band is sideways.

use crate::metrics::max_drawdown_pct;
use crate::price_path::DAYS_PER_YEAR;
use defi_engine_domain::enums::MarketCondition;
use defi_engine_domain::metrics::apy::to_decimal;
use defi_engine_domain::value_objects::MarketAnalysis;
use defi_engine_domain::{EngineError, EngineResult};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Drift-to-volatility ratio beyond which a market counts as trending.
pub const TREND_SIGNAL: f64 = 0.25;

/// Signal at which a trend call reaches full confidence.
const FULL_CONFIDENCE_SIGNAL: f64 = 1.0;

/// Classifies `prices`, sampled `steps_per_day` times a day.
///
/// Fewer than two prices yields a sideways call with zero confidence.
///
/// # Errors
/// Returns [`EngineError::InvalidScenario`] for a non-positive price.
pub fn analyze_market(prices: &[Decimal], steps_per_day: u32) -> EngineResult<MarketAnalysis> {
    let mut values = Vec::with_capacity(prices.len());
    for (i, price) in prices.iter().enumerate() {
        match price.to_f64() {
            Some(v) if v > 0.0 && v.is_finite() => values.push(v),
            _ => {
                return Err(EngineError::invalid_scenario(
                    format!("prices[{i}]"),
                    format!("must be positive, got {price}"),
                ));
            }
        }
    }

    if values.len() < 2 {
        return Ok(MarketAnalysis {
            condition: MarketCondition::Sideways,
            confidence: Decimal::ZERO,
            trends: vec!["Insufficient price history".to_string()],
        });
    }

    let steps_per_year = DAYS_PER_YEAR * f64::from(steps_per_day.max(1));
    let log_returns: Vec<f64> = values.windows(2).map(|w| (w[1] / w[0]).ln()).collect();
    let n = log_returns.len() as f64;
    let mean = log_returns.iter().sum::<f64>() / n;
    let variance = log_returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;

    let annual_drift = mean * steps_per_year;
    let annual_vol = variance.sqrt() * steps_per_year.sqrt();
    let signal = if annual_vol > f64::EPSILON {
        annual_drift / annual_vol
    } else if annual_drift.abs() > f64::EPSILON {
        annual_drift.signum() * FULL_CONFIDENCE_SIGNAL
    } else {
        0.0
    };

    let (condition, confidence) = classify(signal);
    let drawdown = max_drawdown_pct(&values);

    let trends = vec![
        format!("Annualized drift of {:+.1}%", annual_drift * 100.0),
        format!(
            "{} volatility at {:.1}% annualized",
            volatility_regime(annual_vol),
            annual_vol * 100.0
        ),
        format!("Maximum drawdown of {drawdown:.1}%"),
    ];

    Ok(MarketAnalysis {
        condition,
        confidence: to_decimal(confidence).round_dp(1),
        trends,
    })
}

fn classify(signal: f64) -> (MarketCondition, f64) {
    let strength = signal.abs();
    if strength <= TREND_SIGNAL {
        // Strongest when the drift is flat.
        let confidence = 50.0 + 50.0 * (1.0 - strength / TREND_SIGNAL);
        return (MarketCondition::Sideways, confidence);
    }

    let confidence = 50.0
        + 50.0 * ((strength - TREND_SIGNAL) / (FULL_CONFIDENCE_SIGNAL - TREND_SIGNAL)).min(1.0);
    let condition = if signal > 0.0 {
        MarketCondition::Bull
    } else {
        MarketCondition::Bear
    };
    (condition, confidence)
}

fn volatility_regime(annual_vol: f64) -> &'static str {
    match annual_vol {
        v if v < 0.3 => "Low",
        v if v < 0.7 => "Moderate",
        _ => "High",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn series(start: f64, daily: f64, wobble: f64, days: usize) -> Vec<Decimal> {
        (0..=days)
            .map(|i| {
                let bump = if i % 2 == 0 { wobble } else { -wobble };
                let p = start * (1.0 + daily).powi(i as i32) * (1.0 + bump);
                Decimal::from_f64_retain(p).unwrap().round_dp(6)
            })
            .collect()
    }

    #[test]
    fn test_rising_market_is_bull() {
        let analysis = analyze_market(&series(100.0, 0.01, 0.002, 60), 1).unwrap();
        assert_eq!(analysis.condition, MarketCondition::Bull);
        assert!(analysis.confidence > dec!(50));
        assert_eq!(analysis.trends.len(), 3);
    }

    #[test]
    fn test_falling_market_is_bear() {
        let analysis = analyze_market(&series(100.0, -0.01, 0.002, 60), 1).unwrap();
        assert_eq!(analysis.condition, MarketCondition::Bear);
    }

    #[test]
    fn test_oscillating_market_is_sideways() {
        let analysis = analyze_market(&series(100.0, 0.0, 0.02, 60), 1).unwrap();
        assert_eq!(analysis.condition, MarketCondition::Sideways);
        assert!(analysis.confidence >= dec!(50));
        assert!(analysis.confidence <= dec!(100));
    }

    #[test]
    fn test_flat_prices_are_fully_sideways() {
        let analysis = analyze_market(&[dec!(100); 10], 1).unwrap();
        assert_eq!(analysis.condition, MarketCondition::Sideways);
        assert_eq!(analysis.confidence, dec!(100));
    }

    #[test]
    fn test_short_history() {
        let analysis = analyze_market(&[dec!(100)], 1).unwrap();
        assert_eq!(analysis.confidence, Decimal::ZERO);
    }

    #[test]
    fn test_rejects_non_positive_prices() {
        assert!(analyze_market(&[dec!(100), dec!(-1)], 1).is_err());
    }
}
