//! Performance statistics over an equity curve, in `f64`.

/// Simple returns between consecutive equity values.
///
/// A step starting from a non-positive value yields a zero return.
#[must_use]
pub fn step_returns(equity: &[f64]) -> Vec<f64> {
    equity
        .windows(2)
        .map(|w| if w[0] > 0.0 { w[1] / w[0] - 1.0 } else { 0.0 })
        .collect()
}

/// Largest peak-to-trough decline as a percentage of the peak, in [0, 100].
#[must_use]
pub fn max_drawdown_pct(equity: &[f64]) -> f64 {
    let mut peak = f64::MIN;
    let mut worst = 0.0_f64;

    for &value in equity {
        peak = peak.max(value);
        if peak > 0.0 {
            worst = worst.max((peak - value) / peak);
        }
    }

    (worst * 100.0).clamp(0.0, 100.0)
}

/// Annualized Sharpe ratio of per-step returns.
///
/// Zero when there are fewer than two returns or no variance.
#[must_use]
pub fn sharpe_ratio(returns: &[f64], risk_free_per_step: f64, steps_per_year: f64) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let std_dev = variance.sqrt();

    if std_dev < f64::EPSILON {
        return 0.0;
    }

    (mean - risk_free_per_step) / std_dev * steps_per_year.sqrt()
}

/// Percentage of steps that did not lose value, in [0, 100].
///
/// Steps starting from non-positive equity count as losses.
#[must_use]
pub fn win_rate_pct(equity: &[f64]) -> f64 {
    let steps = equity.len().saturating_sub(1);
    if steps == 0 {
        return 0.0;
    }
    let wins = equity
        .windows(2)
        .filter(|w| w[0] > 0.0 && w[1] >= w[0])
        .count();
    wins as f64 / steps as f64 * 100.0
}

/// Value at the given percentile of an ascending-sorted slice.
pub(crate) fn percentile(sorted: &[f64], pct: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = ((sorted.len() as f64 * pct).floor() as usize).min(sorted.len() - 1);
    sorted[idx]
}
