//! Seeded market paths for backtests.
//!
//! Bull and bear markets follow geometric Brownian motion; a sideways market
//! is an Ornstein-Uhlenbeck process on the log price, pulled back towards the
//! opening level. Every step also carries a standard-normal yield shock that
//! strategies scale by their own risk tier.

use defi_engine_domain::enums::MarketCondition;
use defi_engine_domain::{EngineError, EngineResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use rust_decimal::Decimal;
use rust_decimal::prelude::*;

/// Days in a simulated year.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Produces a market path of a given length.
pub trait PathGenerator {
    fn generate(&mut self, steps: usize) -> MarketPath;
}

/// Stochastic parameters of one market regime, annualized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketParams {
    /// Annualized drift (mu).
    pub drift: f64,
    /// Annualized volatility (sigma).
    pub volatility: f64,
    /// Speed of mean reversion per year (theta). Zero for GBM.
    pub mean_reversion: f64,
    /// Scales quoted APYs; yields run hot in bull markets.
    pub yield_multiplier: f64,
}

impl MarketParams {
    #[must_use]
    pub fn for_condition(condition: MarketCondition) -> Self {
        match condition {
            MarketCondition::Bull => Self {
                drift: 0.45,
                volatility: 0.55,
                mean_reversion: 0.0,
                yield_multiplier: 1.15,
            },
            MarketCondition::Bear => Self {
                drift: -0.45,
                volatility: 0.65,
                mean_reversion: 0.0,
                yield_multiplier: 0.8,
            },
            MarketCondition::Sideways => Self {
                drift: 0.0,
                volatility: 0.35,
                mean_reversion: 8.0,
                yield_multiplier: 1.0,
            },
        }
    }

    fn is_mean_reverting(&self) -> bool {
        self.mean_reversion > 0.0
    }
}

/// One simulated step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketStep {
    /// Price at the end of the step.
    pub price: f64,
    /// Simple return over the step.
    pub price_return: f64,
    /// Multiplier applied to quoted yields for this step.
    pub yield_factor: f64,
    /// Standard-normal draw strategies scale by their risk tier.
    pub yield_shock: f64,
}

/// A price/yield path shared by every strategy of a scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketPath {
    pub initial_price: f64,
    pub steps_per_day: u32,
    pub steps: Vec<MarketStep>,
}

impl MarketPath {
    /// Replays a historical price series. The first price opens the path;
    /// each later price becomes one step with a neutral yield factor.
    ///
    /// # Errors
    /// Returns an error for fewer than two prices or a non-positive price.
    pub fn from_prices(prices: &[Decimal], steps_per_day: u32) -> EngineResult<Self> {
        if prices.len() < 2 {
            return Err(EngineError::invalid_scenario(
                "prices",
                "historical path needs at least two prices",
            ));
        }
        if steps_per_day == 0 {
            return Err(EngineError::invalid_scenario(
                "stepsPerDay",
                "must be at least 1",
            ));
        }

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

        let steps = values
            .windows(2)
            .map(|w| MarketStep {
                price: w[1],
                price_return: w[1] / w[0] - 1.0,
                yield_factor: 1.0,
                yield_shock: 0.0,
            })
            .collect();

        Ok(Self {
            initial_price: values[0],
            steps_per_day,
            steps,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Simulated calendar days covered by the path.
    #[must_use]
    pub fn days(&self) -> f64 {
        self.steps.len() as f64 / f64::from(self.steps_per_day.max(1))
    }

    /// Opening price followed by every step's closing price.
    #[must_use]
    pub fn prices(&self) -> Vec<Decimal> {
        std::iter::once(self.initial_price)
            .chain(self.steps.iter().map(|s| s.price))
            .map(|p| Decimal::from_f64(p).unwrap_or(Decimal::ZERO))
            .collect()
    }

    #[must_use]
    pub fn final_price(&self) -> f64 {
        self.steps.last().map_or(self.initial_price, |s| s.price)
    }
}

/// Seeded generator for synthetic paths. One instance per run.
#[derive(Debug, Clone)]
pub struct MarketPathGenerator {
    pub params: MarketParams,
    pub initial_price: f64,
    pub steps_per_day: u32,
    rng: StdRng,
}

impl MarketPathGenerator {
    #[must_use]
    pub fn new(condition: MarketCondition, seed: u64) -> Self {
        Self {
            params: MarketParams::for_condition(condition),
            initial_price: 100.0,
            steps_per_day: 1,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    #[must_use]
    pub fn with_params(mut self, params: MarketParams) -> Self {
        self.params = params;
        self
    }

    #[must_use]
    pub fn with_initial_price(mut self, price: f64) -> Self {
        self.initial_price = price;
        self
    }

    #[must_use]
    pub fn with_steps_per_day(mut self, steps_per_day: u32) -> Self {
        self.steps_per_day = steps_per_day.max(1);
        self
    }

    fn time_step(&self) -> f64 {
        1.0 / (DAYS_PER_YEAR * f64::from(self.steps_per_day))
    }
}

impl PathGenerator for MarketPathGenerator {
    fn generate(&mut self, steps: usize) -> MarketPath {
        let dt = self.time_step();
        let MarketParams {
            drift,
            volatility,
            mean_reversion,
            yield_multiplier,
        } = self.params;
        let vol_term = volatility * dt.sqrt();
        let gbm_drift = (drift - 0.5 * volatility.powi(2)) * dt;
        let anchor = self.initial_price.ln();

        let mut log_price = anchor;
        let mut path = Vec::with_capacity(steps);

        for _ in 0..steps {
            let z: f64 = self.rng.sample(StandardNormal);
            let yield_shock: f64 = self.rng.sample(StandardNormal);

            let previous = log_price;
            log_price += if self.params.is_mean_reverting() {
                mean_reversion * (anchor - log_price) * dt + drift * dt + vol_term * z
            } else {
                gbm_drift + vol_term * z
            };

            path.push(MarketStep {
                price: log_price.exp(),
                price_return: (log_price - previous).exp() - 1.0,
                yield_factor: yield_multiplier,
                yield_shock,
            });
        }

        MarketPath {
            initial_price: self.initial_price,
            steps_per_day: self.steps_per_day,
            steps: path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_same_seed_same_path() {
        let a = MarketPathGenerator::new(MarketCondition::Bull, 42).generate(200);
        let b = MarketPathGenerator::new(MarketCondition::Bull, 42).generate(200);
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seeds_diverge() {
        let a = MarketPathGenerator::new(MarketCondition::Bear, 1).generate(50);
        let b = MarketPathGenerator::new(MarketCondition::Bear, 2).generate(50);
        assert_ne!(a, b);
    }

    #[test]
    fn test_path_shape() {
        let path = MarketPathGenerator::new(MarketCondition::Sideways, 7)
            .with_steps_per_day(4)
            .generate(40);

        assert_eq!(path.len(), 40);
        assert_eq!(path.prices().len(), 41);
        assert!((path.days() - 10.0).abs() < 1e-12);
        assert!(path.steps.iter().all(|s| s.price > 0.0));

        // Returns chain back to the closing price.
        let rebuilt = path
            .steps
            .iter()
            .fold(path.initial_price, |p, s| p * (1.0 + s.price_return));
        assert!((rebuilt - path.final_price()).abs() < 1e-6);
    }

    #[test]
    fn test_drift_direction_over_many_seeds() {
        let mean_final = |condition| {
            (0..200)
                .map(|seed| {
                    MarketPathGenerator::new(condition, seed)
                        .generate(365)
                        .final_price()
                })
                .sum::<f64>()
                / 200.0
        };

        assert!(mean_final(MarketCondition::Bull) > 110.0);
        assert!(mean_final(MarketCondition::Bear) < 90.0);
    }

    #[test]
    fn test_sideways_stays_near_anchor() {
        let path = MarketPathGenerator::new(MarketCondition::Sideways, 11).generate(730);
        // Stationary std of the log price is sigma / sqrt(2 theta), about 0.09.
        assert!(path.steps.iter().all(|s| (s.price / 100.0).ln().abs() < 0.6));
    }

    #[test]
    fn test_historical_path() {
        let path = MarketPath::from_prices(&[dec!(100), dec!(110), dec!(99)], 1).unwrap();
        assert_eq!(path.len(), 2);
        assert!((path.steps[0].price_return - 0.1).abs() < 1e-12);
        assert!((path.steps[1].price_return + 0.1).abs() < 1e-12);
        assert_eq!(path.final_price(), 99.0);
    }

    #[test]
    fn test_historical_path_rejects_bad_prices() {
        assert!(MarketPath::from_prices(&[dec!(100)], 1).is_err());
        assert!(matches!(
            MarketPath::from_prices(&[dec!(100), dec!(0)], 1),
            Err(EngineError::InvalidScenario { field, .. }) if field == "prices[1]"
        ));
    }
}
