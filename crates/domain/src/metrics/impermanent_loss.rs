/// Impermanent loss in percent of a constant product position whose price
/// moved by `price_ratio` since entry.
///
/// IL = 2 * sqrt(r) / (1 + r) - 1. A non-positive or non-finite ratio is
/// treated as a total loss.
pub fn il_percent(price_ratio: f64) -> f64 {
    if price_ratio <= 0.0 || !price_ratio.is_finite() {
        return -100.0;
    }
    (2.0 * price_ratio.sqrt() / (1.0 + price_ratio) - 1.0) * 100.0
}
